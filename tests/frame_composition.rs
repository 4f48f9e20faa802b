mod common;

use glam::Vec2;
use jungle_viewer::asset::{AssetError, GltfLoader};
use jungle_viewer::error::SceneError;
use jungle_viewer::renderer::{
    CubeFace, DeviceEvent, HeadlessDevice, Program, RecordedDraw, RenderDevice, RenderError,
    RenderTarget, TargetDescriptor,
};
use jungle_viewer::scene::{jungle, JungleLayout, Scene};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use winit::keyboard::KeyCode;

fn capture_contents(gfx: &HeadlessDevice, scene: &Scene) -> Vec<Vec<RecordedDraw>> {
    CubeFace::ALL
        .iter()
        .map(|&face| {
            gfx.contents(RenderTarget::CubeFace(scene.environment_map(), face))
                .to_vec()
        })
        .collect()
}

fn draws_into(events: &[DeviceEvent], target: RenderTarget) -> Vec<(usize, Program, bool)> {
    events
        .iter()
        .enumerate()
        .filter_map(|(i, event)| match event {
            DeviceEvent::Draw {
                target: t,
                program,
                blend,
                ..
            } if *t == target => Some((i, *program, *blend)),
            _ => None,
        })
        .collect()
}

#[test]
fn screen_frame_runs_shadow_then_capture_then_main_pass() {
    let mut gfx = common::device();
    let mut scene = common::build(&mut gfx);
    gfx.take_events();

    scene.render_frame(&mut gfx, true).unwrap();
    let events = gfx.take_events();

    let shadow = draws_into(&events, RenderTarget::Depth(scene.shadow_map()));
    let capture: Vec<_> = CubeFace::ALL
        .iter()
        .flat_map(|&face| {
            draws_into(
                &events,
                RenderTarget::CubeFace(scene.environment_map(), face),
            )
        })
        .collect();
    let screen = draws_into(&events, RenderTarget::Screen);

    assert!(!shadow.is_empty() && !capture.is_empty() && !screen.is_empty());
    assert!(shadow.iter().all(|&(_, program, _)| program == Program::DepthOnly));

    let last_shadow = shadow.iter().map(|d| d.0).max().unwrap();
    let first_capture = capture.iter().map(|d| d.0).min().unwrap();
    let last_capture = capture.iter().map(|d| d.0).max().unwrap();
    let reflective = screen
        .iter()
        .find(|&&(_, program, _)| program == Program::Reflective)
        .expect("reflective object drawn");

    assert!(last_shadow < first_capture);
    assert!(last_capture < reflective.0);

    // The sky is the first thing on screen.
    assert_eq!(screen[0].1, Program::Sky);
    assert!(matches!(events.last(), Some(DeviceEvent::Present)));
    assert!(!events.contains(&DeviceEvent::Flush));
}

#[test]
fn blending_covers_exactly_the_capture_and_opaque_draws() {
    let mut gfx = common::device();
    let mut scene = common::build(&mut gfx);
    gfx.take_events();

    scene.render_frame(&mut gfx, true).unwrap();
    let events = gfx.take_events();

    let enable = events
        .iter()
        .position(|e| *e == DeviceEvent::SetBlend(true))
        .unwrap();
    let disable = events
        .iter()
        .rposition(|e| *e == DeviceEvent::SetBlend(false))
        .unwrap();
    assert!(enable < disable);
    assert_eq!(
        events.iter().filter(|e| **e == DeviceEvent::SetBlend(true)).count(),
        1
    );

    for (i, event) in events.iter().enumerate() {
        if let DeviceEvent::Draw { target, blend, .. } = event {
            let inside = enable < i && i < disable;
            assert_eq!(*blend, inside, "draw {i} into {target:?}");
            if matches!(target, RenderTarget::Depth(_)) {
                assert!(!blend);
            }
        }
    }
    assert!(!gfx.blend_enabled());
}

#[test]
fn off_screen_frames_leave_blending_disabled_even_if_it_was_on() {
    let mut gfx = common::device();
    let mut scene = common::build(&mut gfx);
    let probe = gfx
        .create_target(TargetDescriptor::color_cube("Probe", 32))
        .unwrap();
    gfx.bind_target(RenderTarget::CubeFace(probe, CubeFace::PositiveZ));
    gfx.set_blend(true);

    scene.render_frame(&mut gfx, false).unwrap();

    assert!(!gfx.blend_enabled());
    assert!(gfx
        .events()
        .iter()
        .all(|e| !matches!(e, DeviceEvent::Draw { blend: true, .. })));
}

#[test]
fn off_screen_frame_keeps_camera_and_skips_capture() {
    let mut gfx = common::device();
    let (mut scene, origins) = common::spy_on_capture(common::build(&mut gfx));

    let probe = gfx
        .create_target(TargetDescriptor::color_cube("Probe", 32))
        .unwrap();
    let destination = RenderTarget::CubeFace(probe, CubeFace::NegativeX);
    gfx.bind_target(destination);
    gfx.take_events();

    scene.camera_mut().queue_rotation(Vec2::new(40.0, -10.0));
    let camera = *scene.camera();

    scene.render_frame(&mut gfx, false).unwrap();

    assert_eq!(scene.camera(), &camera);
    assert!(origins.borrow().is_empty());

    let events = gfx.take_events();
    assert!(events.contains(&DeviceEvent::Flush));
    assert!(!events.contains(&DeviceEvent::Present));
    assert!(draws_into(&events, RenderTarget::Screen).is_empty());

    let drawn = gfx.contents(destination);
    assert!(!drawn.is_empty());
    assert!(drawn
        .iter()
        .all(|d| !matches!(d.program, Program::Sky | Program::Reflective | Program::DepthOverlay)));

    // The shadow map is still rendered for the off-screen view.
    assert!(!gfx.contents(RenderTarget::Depth(scene.shadow_map())).is_empty());
}

#[test]
fn unchanged_scene_renders_identical_depth_and_capture_contents() {
    let mut gfx = common::device();
    let mut scene = common::build(&mut gfx);

    scene.render_frame(&mut gfx, true).unwrap();
    let depth = gfx.contents(RenderTarget::Depth(scene.shadow_map())).to_vec();
    let capture = capture_contents(&gfx, &scene);

    scene.render_frame(&mut gfx, true).unwrap();

    assert!(!depth.is_empty());
    assert_eq!(gfx.contents(RenderTarget::Depth(scene.shadow_map())), depth.as_slice());
    assert_eq!(capture_contents(&gfx, &scene), capture);
    assert_eq!(scene.frames(), 2);
}

#[test]
fn shadow_map_is_overwritten_not_accumulated() {
    let mut gfx = common::device();
    let mut scene = common::build(&mut gfx);
    let casters = scene.objects().shadow_casters().count();

    for _ in 0..3 {
        scene.render_frame(&mut gfx, true).unwrap();
        assert_eq!(gfx.contents(RenderTarget::Depth(scene.shadow_map())).len(), casters);
    }
}

#[test]
fn no_draw_samples_the_target_it_renders_into() {
    let mut gfx = common::device();
    let mut scene = common::build(&mut gfx);

    scene.render_frame(&mut gfx, true).unwrap();
    scene.render_frame(&mut gfx, false).unwrap();

    assert!(gfx.sampling_hazards().is_empty(), "{:?}", gfx.sampling_hazards());
}

#[test]
fn rejecting_every_candidate_leaves_vegetation_empty() {
    let mut gfx = common::device();
    let layout = jungle_viewer::scene::JungleLayout {
        vegetation: vec!["single_tree".to_string()],
        attempts: 1,
        exclusion: |_, _| true,
        ..common::layout()
    };
    let mut scene = common::try_build(&mut gfx, &layout).unwrap();

    assert!(scene.objects().vegetation.is_empty());
    scene.render_frame(&mut gfx, true).unwrap();
    scene.render_frame(&mut gfx, false).unwrap();
}

#[test]
fn editing_the_reflective_object_moves_the_capture_origin() {
    let mut gfx = common::device();
    let (mut scene, origins) = common::spy_on_capture(common::build(&mut gfx));

    scene.render_frame(&mut gfx, true).unwrap();
    let before = scene.objects().reflective.world_position();
    let capture_before = capture_contents(&gfx, &scene);

    assert!(scene.on_key(KeyCode::KeyW));
    assert!(scene.objects().reflective.is_dirty());
    let after = scene.objects().reflective.world_position();
    assert!(after.y > before.y);

    scene.render_frame(&mut gfx, true).unwrap();

    assert_eq!(origins.borrow().as_slice(), &[before, after]);
    assert!(!scene.objects().reflective.is_dirty());
    assert_ne!(capture_contents(&gfx, &scene), capture_before);
}

#[test]
fn key_presses_do_not_draw() {
    let mut gfx = common::device();
    let mut scene = common::build(&mut gfx);
    gfx.take_events();

    scene.on_key(KeyCode::ArrowRight);
    scene.on_key(KeyCode::KeyZ);

    assert!(gfx.events().is_empty());
}

#[test]
fn unmapped_keys_are_ignored() {
    let mut gfx = common::device();
    let mut scene = common::build(&mut gfx);
    let before = scene.objects().reflective.transform();

    assert!(!scene.on_key(KeyCode::KeyZ));
    assert!(!scene.on_key(KeyCode::Space));
    assert_eq!(scene.objects().reflective.transform(), before);
    assert!(!scene.objects().reflective.is_dirty());
}

#[test]
fn tab_toggles_the_shadow_map_overlay() {
    let mut gfx = common::device();
    let mut scene = common::build(&mut gfx);
    assert!(scene.overlay_enabled());

    let overlay_drawn = |gfx: &HeadlessDevice| {
        gfx.contents(RenderTarget::Screen)
            .iter()
            .any(|d| d.program == Program::DepthOverlay)
    };

    scene.render_frame(&mut gfx, true).unwrap();
    assert!(overlay_drawn(&gfx));

    assert!(scene.on_key(KeyCode::Tab));
    assert!(!scene.overlay_enabled());
    scene.render_frame(&mut gfx, true).unwrap();
    assert!(!overlay_drawn(&gfx));
}

#[test]
fn target_allocation_failure_is_fatal() {
    let mut gfx = HeadlessDevice::new(320, 240).with_max_target_size(128);
    let err = common::try_build(&mut gfx, &common::layout()).err().unwrap();

    assert!(matches!(
        err,
        SceneError::Render(RenderError::TargetAllocation { size: 256, .. })
    ));

    // A shadow map that fits is released again when the cube does not.
    let layout = JungleLayout {
        shadow_map_size: 64,
        environment_map_size: 256,
        ..common::layout()
    };
    let mut gfx = HeadlessDevice::new(320, 240).with_max_target_size(128);
    let err = common::try_build(&mut gfx, &layout).err().unwrap();

    assert!(matches!(
        err,
        SceneError::Render(RenderError::TargetAllocation { size: 256, .. })
    ));
    assert_eq!(gfx.live_targets(), 0);
}

#[test]
fn unknown_vegetation_model_fails_the_build() {
    let mut gfx = common::device();
    let layout = JungleLayout {
        vegetation: vec!["unicorn".into()],
        ..common::layout()
    };
    let err = common::try_build(&mut gfx, &layout).err().unwrap();

    assert!(matches!(
        err,
        SceneError::Model {
            ref name,
            source: AssetError::UnknownPlaceholder(_),
        } if name == "unicorn"
    ));
    assert_eq!(gfx.live_targets(), 0);
}

#[test]
fn missing_model_files_fail_the_build() {
    let mut gfx = common::device();
    let layout = JungleLayout {
        model_dir: std::env::temp_dir().join("jungle-viewer-no-models"),
        ..common::layout()
    };
    let mut rng = SmallRng::seed_from_u64(common::SEED);
    let err = jungle::build(&mut gfx, &GltfLoader, &layout, &mut rng)
        .err()
        .unwrap();

    assert!(matches!(
        err,
        SceneError::Model {
            ref name,
            source: AssetError::NotFound(_),
        } if name == "ground"
    ));
    assert_eq!(gfx.live_targets(), 0);
    assert!(gfx.events().iter().all(|e| !matches!(e, DeviceEvent::Draw { .. })));
}

#[test]
fn non_positive_extent_is_rejected() {
    let mut gfx = common::device();
    let layout = jungle_viewer::scene::JungleLayout {
        extent: 0.0,
        ..common::layout()
    };
    let err = common::try_build(&mut gfx, &layout).err().unwrap();

    assert!(matches!(
        err,
        SceneError::InvalidSetting {
            name: "vegetation.extent",
            ..
        }
    ));
}

#[test]
fn release_frees_every_owned_target() {
    let mut gfx = common::device();
    let mut scene = common::build(&mut gfx);
    scene.render_frame(&mut gfx, true).unwrap();
    assert_eq!(gfx.live_targets(), 2);

    let shadow = scene.shadow_map();
    let environment = scene.environment_map();
    scene.release(&mut gfx);

    assert_eq!(gfx.live_targets(), 0);
    assert!(!gfx.is_live(shadow) && !gfx.is_live(environment));
}

use glam::{Mat4, Vec3};
use jungle_viewer::renderer::passes::shadow::{light_view_proj, SHADOW_FOCUS};
use jungle_viewer::scene::jungle::{
    diamond_transform, hippo_transform, tiger_transform, water_transform, LIGHT_POSITION,
};

const EPSILON: f32 = 1e-5;

/// CPU mirror of the shadow lookup in `shadowed.wgsl`: texture uv plus
/// depth, or `None` outside the light frustum.
fn project_shadow_cpu(matrix: Mat4, world_pos: Vec3) -> Option<Vec3> {
    let clip = matrix * world_pos.extend(1.0);
    if clip.w <= 0.0 {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    let uv = Vec3::new(ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5, ndc.z);
    let inside = (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y) && uv.z <= 1.0;
    inside.then_some(uv)
}

fn compute_ndc(matrix: Mat4, world_pos: Vec3) -> Vec3 {
    let clip = matrix * world_pos.extend(1.0);
    clip.truncate() / clip.w
}

#[test]
fn scene_actors_land_inside_the_shadow_map() {
    let view_proj = light_view_proj(LIGHT_POSITION);

    for transform in [
        water_transform(),
        hippo_transform(),
        tiger_transform(),
        diamond_transform(),
    ] {
        let position = transform.w_axis.truncate();
        let projected = project_shadow_cpu(view_proj, position)
            .unwrap_or_else(|| panic!("{position:?} is outside the light frustum"));
        assert!(projected.z >= 0.0 - EPSILON && projected.z <= 1.0 + EPSILON);
    }
}

#[test]
fn occluder_between_light_and_receiver_is_closer_in_depth() {
    let view_proj = light_view_proj(LIGHT_POSITION);
    let receiver = SHADOW_FOCUS;
    let occluder = LIGHT_POSITION.lerp(receiver, 0.5);

    let r = project_shadow_cpu(view_proj, receiver).unwrap();
    let o = project_shadow_cpu(view_proj, occluder).unwrap();

    assert!((r.x - o.x).abs() < EPSILON && (r.y - o.y).abs() < EPSILON);
    assert!(o.z < r.z);
}

#[test]
fn shadow_texture_axis_is_flipped_from_clip_space() {
    let view_proj = light_view_proj(LIGHT_POSITION);
    let top_world = SHADOW_FOCUS + Vec3::Y * 2.0;
    let bottom_world = SHADOW_FOCUS - Vec3::Y * 2.0;

    let ndc_top = compute_ndc(view_proj, top_world);
    let ndc_bottom = compute_ndc(view_proj, bottom_world);
    assert!(ndc_top.y > ndc_bottom.y);

    let tex_top = project_shadow_cpu(view_proj, top_world).unwrap();
    let tex_bottom = project_shadow_cpu(view_proj, bottom_world).unwrap();
    assert!(tex_top.y < tex_bottom.y);
    assert!((tex_top.z - ndc_top.z).abs() < EPSILON);
}

#[test]
fn points_behind_the_light_are_rejected() {
    let view_proj = light_view_proj(LIGHT_POSITION);
    let behind = LIGHT_POSITION + (LIGHT_POSITION - SHADOW_FOCUS);

    assert!((view_proj * behind.extend(1.0)).w <= 0.0);
    assert_eq!(project_shadow_cpu(view_proj, behind), None);
}

#[test]
fn light_directly_overhead_still_projects_the_focus() {
    let view_proj = light_view_proj(SHADOW_FOCUS + Vec3::Y * 12.0);
    let projected = project_shadow_cpu(view_proj, SHADOW_FOCUS).unwrap();

    assert!((projected.x - 0.5).abs() < EPSILON);
    assert!((projected.y - 0.5).abs() < EPSILON);
}

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use jungle_viewer::asset::PlaceholderLoader;
use jungle_viewer::error::SceneError;
use jungle_viewer::renderer::passes::{CaptureView, EnvironmentCapture};
use jungle_viewer::renderer::{DeviceEvent, HeadlessDevice, RenderDevice, TargetHandle};
use jungle_viewer::scene::{jungle, JungleLayout, Scene};
use rand::rngs::SmallRng;
use rand::SeedableRng;

pub const SEED: u64 = 7;

/// Small targets keep the recorded frames short.
pub fn layout() -> JungleLayout {
    JungleLayout {
        shadow_map_size: 256,
        environment_map_size: 64,
        ..JungleLayout::default()
    }
}

pub fn device() -> HeadlessDevice {
    HeadlessDevice::new(320, 240)
}

pub fn try_build(gfx: &mut HeadlessDevice, layout: &JungleLayout) -> Result<Scene, SceneError> {
    let mut rng = SmallRng::seed_from_u64(SEED);
    jungle::build(gfx, &PlaceholderLoader, layout, &mut rng)
}

pub fn build(gfx: &mut HeadlessDevice) -> Scene {
    try_build(gfx, &layout()).expect("placeholder jungle builds")
}

/// Records the origin of every capture update before delegating.
pub struct SpyCapture {
    inner: Box<dyn EnvironmentCapture>,
    origins: Rc<RefCell<Vec<Vec3>>>,
}

impl EnvironmentCapture for SpyCapture {
    fn environment_map(&self) -> TargetHandle {
        self.inner.environment_map()
    }

    fn update(&mut self, gfx: &mut dyn RenderDevice, view: &CaptureView<'_>) {
        self.origins
            .borrow_mut()
            .push(view.objects.reflective.world_position());
        self.inner.update(gfx, view);
    }

    fn release(&self, gfx: &mut dyn RenderDevice) {
        self.inner.release(gfx);
    }
}

pub fn spy_on_capture(scene: Scene) -> (Scene, Rc<RefCell<Vec<Vec3>>>) {
    let origins = Rc::new(RefCell::new(Vec::new()));
    let shared = Rc::clone(&origins);
    let scene = scene.map_capture(move |inner| {
        Box::new(SpyCapture {
            inner,
            origins: shared,
        })
    });
    (scene, origins)
}

pub fn position_of(events: &[DeviceEvent], pred: impl Fn(&DeviceEvent) -> bool) -> Option<usize> {
    events.iter().position(pred)
}

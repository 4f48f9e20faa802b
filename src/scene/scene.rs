use winit::keyboard::KeyCode;

use crate::renderer::passes::{
    DepthOverlay, EnvironmentCapture, FrameComposer, FrameInputs, ShadowPass, SkyBackdrop,
};
use crate::renderer::{RenderDevice, RenderError, TargetHandle};
use crate::scene::camera::Camera;
use crate::scene::input::TransformEditor;
use crate::scene::light::LightSource;
use crate::scene::objects::SceneObjects;

/// Key that shows or hides the shadow-map inset.
pub const OVERLAY_TOGGLE_KEY: KeyCode = KeyCode::Tab;

/// Everything a [`Scene`] is assembled from.
pub struct SceneParts {
    pub camera: Camera,
    pub light: LightSource,
    pub objects: SceneObjects,
    pub shadows: ShadowPass,
    pub capture: Box<dyn EnvironmentCapture>,
    pub sky: SkyBackdrop,
    pub overlay: DepthOverlay,
}

/// The aggregate root: owns the camera, light, drawables and the passes
/// that render them.
pub struct Scene {
    camera: Camera,
    light: LightSource,
    objects: SceneObjects,
    shadows: ShadowPass,
    capture: Box<dyn EnvironmentCapture>,
    sky: SkyBackdrop,
    overlay: DepthOverlay,
    editor: TransformEditor,
    composer: FrameComposer,
}

impl Scene {
    pub fn new(parts: SceneParts) -> Self {
        Self {
            camera: parts.camera,
            light: parts.light,
            objects: parts.objects,
            shadows: parts.shadows,
            capture: parts.capture,
            sky: parts.sky,
            overlay: parts.overlay,
            editor: TransformEditor,
            composer: FrameComposer::default(),
        }
    }

    /// Replaces the environment capture with a wrapper around it.
    pub fn map_capture(
        self,
        wrap: impl FnOnce(Box<dyn EnvironmentCapture>) -> Box<dyn EnvironmentCapture>,
    ) -> Self {
        let capture = wrap(self.capture);
        Self { capture, ..self }
    }

    pub fn render_frame(
        &mut self,
        gfx: &mut dyn RenderDevice,
        to_screen: bool,
    ) -> Result<(), RenderError> {
        let inputs = FrameInputs {
            camera: &mut self.camera,
            light: &self.light,
            objects: &mut self.objects,
            shadows: &self.shadows,
            capture: self.capture.as_mut(),
            sky: &self.sky,
            overlay: &self.overlay,
        };
        self.composer.render_frame(gfx, inputs, to_screen)
    }

    /// Handles a key press. Returns whether anything changed; the change
    /// shows up on the next frame.
    pub fn on_key(&mut self, key: KeyCode) -> bool {
        if key == OVERLAY_TOGGLE_KEY {
            self.overlay.toggle();
            return true;
        }
        self.editor.on_key(key, &mut self.objects.reflective)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn objects(&self) -> &SceneObjects {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut SceneObjects {
        &mut self.objects
    }

    pub fn shadow_map(&self) -> TargetHandle {
        self.shadows.shadow_map()
    }

    pub fn environment_map(&self) -> TargetHandle {
        self.capture.environment_map()
    }

    pub fn overlay_enabled(&self) -> bool {
        self.overlay.enabled
    }

    pub fn frames(&self) -> u64 {
        self.composer.frames()
    }

    /// Releases the off-screen targets owned by the passes.
    pub fn release(self, gfx: &mut dyn RenderDevice) {
        log::info!("Releasing scene render targets");
        self.shadows.release(gfx);
        self.capture.release(gfx);
    }
}

use glam::Mat4;

use crate::renderer::passes::blend::BlendScope;
use crate::renderer::passes::capture::{CaptureView, EnvironmentCapture};
use crate::renderer::passes::overlay::DepthOverlay;
use crate::renderer::passes::shadow::{light_view_proj, ShadowPass};
use crate::renderer::passes::sky::SkyBackdrop;
use crate::renderer::{ClearFlags, FrameUniforms, RenderDevice, RenderError, RenderTarget};
use crate::scene::{Camera, LightSource, SceneObjects};

pub const CLEAR_COLOR: [f32; 4] = [0.05, 0.07, 0.1, 1.0];

/// One unit of work inside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStep {
    ClearDestination,
    Sky,
    Shadow,
    Capture,
    Opaque,
    Overlay,
    Vegetation,
    Models,
    Present,
    Flush,
}

impl FrameStep {
    /// Steps that must already have run in the same frame.
    pub fn depends_on(self) -> &'static [FrameStep] {
        use FrameStep::*;
        match self {
            ClearDestination | Shadow => &[],
            Sky => &[ClearDestination],
            Capture => &[Shadow],
            Opaque => &[ClearDestination, Capture],
            Overlay => &[Opaque],
            Vegetation => &[ClearDestination, Shadow],
            Models => &[Vegetation],
            Present | Flush => &[Models],
        }
    }
}

/// Consecutive steps sharing one blend state.
#[derive(Debug, Clone, Copy)]
pub struct Stage {
    pub blended: bool,
    pub steps: &'static [FrameStep],
}

pub const SCREEN_SCHEDULE: &[Stage] = &[
    Stage {
        blended: false,
        steps: &[FrameStep::ClearDestination, FrameStep::Sky, FrameStep::Shadow],
    },
    Stage {
        blended: true,
        steps: &[FrameStep::Capture, FrameStep::Opaque],
    },
    Stage {
        blended: false,
        steps: &[
            FrameStep::Overlay,
            FrameStep::Vegetation,
            FrameStep::Models,
            FrameStep::Present,
        ],
    },
];

pub const OFFSCREEN_SCHEDULE: &[Stage] = &[Stage {
    blended: false,
    steps: &[
        FrameStep::ClearDestination,
        FrameStep::Shadow,
        FrameStep::Vegetation,
        FrameStep::Models,
        FrameStep::Flush,
    ],
}];

/// Returns the first step whose dependencies do not all run before it.
pub fn first_unordered_step(schedule: &[Stage]) -> Option<FrameStep> {
    let mut done: Vec<FrameStep> = Vec::new();
    for step in schedule.iter().flat_map(|stage| stage.steps.iter().copied()) {
        if !step.depends_on().iter().all(|dep| done.contains(dep)) {
            return Some(step);
        }
        done.push(step);
    }
    None
}

/// Borrowed scene state for one frame.
pub struct FrameInputs<'a> {
    pub camera: &'a mut Camera,
    pub light: &'a LightSource,
    pub objects: &'a mut SceneObjects,
    pub shadows: &'a ShadowPass,
    pub capture: &'a mut dyn EnvironmentCapture,
    pub sky: &'a SkyBackdrop,
    pub overlay: &'a DepthOverlay,
}

struct FrameState {
    destination: RenderTarget,
    view: FrameUniforms,
    light: FrameUniforms,
}

/// Drives one frame through a fixed schedule of steps.
#[derive(Debug, Clone)]
pub struct FrameComposer {
    clear_color: [f32; 4],
    frames: u64,
}

impl Default for FrameComposer {
    fn default() -> Self {
        Self::new(CLEAR_COLOR)
    }
}

impl FrameComposer {
    pub fn new(clear_color: [f32; 4]) -> Self {
        debug_assert_eq!(first_unordered_step(SCREEN_SCHEDULE), None);
        debug_assert_eq!(first_unordered_step(OFFSCREEN_SCHEDULE), None);
        Self {
            clear_color,
            frames: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Renders one frame.
    ///
    /// With `to_screen` the camera consumes pending input, the environment
    /// map is refreshed and the image is presented. Otherwise the camera is
    /// left alone, only shadows, vegetation and models are drawn, and they go
    /// into whichever target is bound on entry.
    pub fn render_frame(
        &mut self,
        gfx: &mut dyn RenderDevice,
        mut inputs: FrameInputs<'_>,
        to_screen: bool,
    ) -> Result<(), RenderError> {
        let destination = if to_screen {
            RenderTarget::Screen
        } else {
            gfx.active_target()
        };

        if to_screen && inputs.camera.update() {
            log::trace!("Camera moved to {:?}", inputs.camera.position());
        }

        let light_position = inputs.light.position();
        let light = FrameUniforms::from_light(light_position, light_view_proj(light_position));
        let view = FrameUniforms::new(
            self.view_proj(gfx, inputs.camera, destination),
            inputs.camera.position(),
            light_position,
            light.light_view_proj,
        );
        let mut state = FrameState {
            destination,
            view,
            light,
        };

        gfx.set_blend(false);

        let schedule = if to_screen {
            SCREEN_SCHEDULE
        } else {
            OFFSCREEN_SCHEDULE
        };
        for stage in schedule {
            if stage.blended {
                let mut scope = BlendScope::acquire(gfx);
                for &step in stage.steps {
                    self.run_step(&mut *scope, step, &mut inputs, &mut state)?;
                }
            } else {
                for &step in stage.steps {
                    self.run_step(gfx, step, &mut inputs, &mut state)?;
                }
            }
        }

        debug_assert!(!gfx.blend_enabled());
        self.frames += 1;
        Ok(())
    }

    fn view_proj(
        &self,
        gfx: &dyn RenderDevice,
        camera: &Camera,
        destination: RenderTarget,
    ) -> Mat4 {
        let (width, height) = gfx.target_size(destination);
        let aspect = if width == 0 || height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        };
        camera.view_proj(aspect)
    }

    fn run_step(
        &self,
        gfx: &mut dyn RenderDevice,
        step: FrameStep,
        inputs: &mut FrameInputs<'_>,
        state: &mut FrameState,
    ) -> Result<(), RenderError> {
        log::trace!("Frame {}: {:?}", self.frames, step);
        match step {
            FrameStep::ClearDestination => {
                gfx.bind_target(state.destination);
                gfx.clear(ClearFlags::COLOR | ClearFlags::DEPTH, self.clear_color);
            }
            FrameStep::Sky => {
                bind_destination(gfx, state.destination);
                inputs.sky.draw(gfx, &state.view);
            }
            FrameStep::Shadow => {
                state.light = inputs
                    .shadows
                    .render(gfx, inputs.light, inputs.objects.shadow_casters());
                state.view.light_view_proj = state.light.light_view_proj;
            }
            FrameStep::Capture => {
                let view = CaptureView {
                    objects: &*inputs.objects,
                    sky: inputs.sky,
                    light: &state.light,
                };
                inputs.capture.update(gfx, &view);
                if inputs.objects.reflective.clear_dirty() {
                    log::debug!(
                        "Reflective object edited; environment recaptured at {:?}",
                        inputs.objects.reflective.world_position()
                    );
                }
            }
            FrameStep::Opaque => {
                bind_destination(gfx, state.destination);
                for drawable in inputs.objects.opaque_pass() {
                    drawable.draw(gfx, &state.view);
                }
            }
            FrameStep::Overlay => {
                bind_destination(gfx, state.destination);
                inputs
                    .overlay
                    .draw(gfx, inputs.shadows.shadow_map(), &state.view);
            }
            FrameStep::Vegetation => {
                bind_destination(gfx, state.destination);
                for group in &inputs.objects.vegetation {
                    group.draw(gfx, &state.view);
                }
            }
            FrameStep::Models => {
                bind_destination(gfx, state.destination);
                for group in &inputs.objects.models {
                    group.draw(gfx, &state.view);
                }
            }
            FrameStep::Present => gfx.present()?,
            FrameStep::Flush => gfx.flush()?,
        }
        Ok(())
    }
}

fn bind_destination(gfx: &mut dyn RenderDevice, destination: RenderTarget) {
    if gfx.active_target() != destination {
        gfx.bind_target(destination);
    }
}

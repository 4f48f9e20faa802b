use std::fmt;

use glam::Mat4;

use crate::asset::MeshHandle;
use crate::renderer::device::{DrawCall, Program, RenderDevice, TargetHandle};
use crate::renderer::uniforms::{DrawUniform, FrameUniforms};

/// What a technique needs to know about the thing it is drawing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawInput {
    pub mesh: MeshHandle,
    pub transform: Mat4,
    pub color: [f32; 4],
}

/// A way of shading a mesh: picks the program, fills the uniforms and binds
/// whatever texture the program samples.
///
/// Techniques draw into whatever target is bound and never change blend or
/// target state themselves.
pub trait ShadingTechnique: fmt::Debug {
    fn apply(&self, gfx: &mut dyn RenderDevice, draw: &DrawInput, frame: &FrameUniforms);
}

fn submit(
    gfx: &mut dyn RenderDevice,
    program: Program,
    draw: &DrawInput,
    frame: &FrameUniforms,
    texture: Option<TargetHandle>,
) {
    gfx.draw(&DrawCall {
        program,
        mesh: draw.mesh,
        uniforms: DrawUniform::new(draw.transform, draw.color, frame),
        texture,
    });
}

/// Phong lighting from the key light, no shadows.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainLit;

impl ShadingTechnique for PlainLit {
    fn apply(&self, gfx: &mut dyn RenderDevice, draw: &DrawInput, frame: &FrameUniforms) {
        submit(gfx, Program::Lit, draw, frame, None);
    }
}

/// Phong lighting attenuated by a lookup into the light's depth map.
#[derive(Debug, Clone, Copy)]
pub struct ShadowSampling {
    pub shadow_map: TargetHandle,
}

impl ShadingTechnique for ShadowSampling {
    fn apply(&self, gfx: &mut dyn RenderDevice, draw: &DrawInput, frame: &FrameUniforms) {
        submit(gfx, Program::ShadowLit, draw, frame, Some(self.shadow_map));
    }
}

/// Mirror-like surface sampling a captured cube map along the reflected view
/// ray.
#[derive(Debug, Clone, Copy)]
pub struct EnvironmentSampling {
    pub environment_map: TargetHandle,
}

impl ShadingTechnique for EnvironmentSampling {
    fn apply(&self, gfx: &mut dyn RenderDevice, draw: &DrawInput, frame: &FrameUniforms) {
        submit(gfx, Program::Reflective, draw, frame, Some(self.environment_map));
    }
}

/// Writes depth only; used by the shadow pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct DepthOnly;

impl ShadingTechnique for DepthOnly {
    fn apply(&self, gfx: &mut dyn RenderDevice, draw: &DrawInput, frame: &FrameUniforms) {
        submit(gfx, Program::DepthOnly, draw, frame, None);
    }
}

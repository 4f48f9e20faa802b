use glam::{Mat4, Vec3};

use crate::asset::MeshHandle;
use crate::renderer::primitives::cube_mesh;
use crate::renderer::{DrawCall, DrawUniform, FrameUniforms, Program, RenderDevice};

const SKY_SCALE: f32 = 50.0;
pub const ZENITH_COLOR: [f32; 4] = [0.18, 0.38, 0.72, 1.0];

/// Background cube that follows the viewer and always lands on the far
/// plane. Draw it before anything else in a view.
#[derive(Debug, Clone)]
pub struct SkyBackdrop {
    mesh: MeshHandle,
    color: [f32; 4],
}

impl SkyBackdrop {
    pub fn new(gfx: &mut dyn RenderDevice) -> Self {
        Self {
            mesh: gfx.upload_mesh(&cube_mesh().with_name("sky")),
            color: ZENITH_COLOR,
        }
    }

    pub fn draw(&self, gfx: &mut dyn RenderDevice, frame: &FrameUniforms) {
        let model = Mat4::from_translation(frame.camera_position)
            * Mat4::from_scale(Vec3::splat(SKY_SCALE));
        gfx.draw(&DrawCall {
            program: Program::Sky,
            mesh: self.mesh,
            uniforms: DrawUniform::new(model, self.color, frame),
            texture: None,
        });
    }
}

use glam::{Mat4, Vec3};

use crate::asset::MeshHandle;
use crate::renderer::primitives::screen_quad_mesh;
use crate::renderer::{DrawCall, DrawUniform, FrameUniforms, Program, RenderDevice, TargetHandle};

/// Shows a depth target as a greyscale inset in the top-right corner.
#[derive(Debug, Clone)]
pub struct DepthOverlay {
    mesh: MeshHandle,
    placement: Mat4,
    pub enabled: bool,
}

impl DepthOverlay {
    pub fn new(gfx: &mut dyn RenderDevice, enabled: bool) -> Self {
        Self {
            mesh: gfx.upload_mesh(&screen_quad_mesh().with_name("depth overlay")),
            placement: Mat4::from_translation(Vec3::new(0.7, 0.7, 0.0))
                * Mat4::from_scale(Vec3::new(0.28, 0.28, 1.0)),
            enabled,
        }
    }

    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        log::info!("Shadow map overlay {}", if self.enabled { "on" } else { "off" });
        self.enabled
    }

    pub fn draw(&self, gfx: &mut dyn RenderDevice, depth: TargetHandle, frame: &FrameUniforms) {
        if !self.enabled {
            return;
        }
        gfx.draw(&DrawCall {
            program: Program::DepthOverlay,
            mesh: self.mesh,
            uniforms: DrawUniform::new(self.placement, [1.0; 4], frame),
            texture: Some(depth),
        });
    }
}

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3};

use crate::renderer::{
    ClearFlags, DepthOnly, FrameUniforms, RenderDevice, RenderError, RenderTarget, TargetDescriptor,
    TargetHandle,
};
use crate::scene::{Drawable, LightSource};

/// Point the light's frustum is aimed at; roughly the middle of the clearing.
pub const SHADOW_FOCUS: Vec3 = Vec3::new(0.0, -4.0, 2.0);
const SHADOW_FOV: f32 = FRAC_PI_2;
const SHADOW_NEAR: f32 = 1.0;
const SHADOW_FAR: f32 = 40.0;

/// View-projection of the light looking at [`SHADOW_FOCUS`].
pub fn light_view_proj(light: Vec3) -> Mat4 {
    let direction = (SHADOW_FOCUS - light).normalize_or_zero();
    let up = if direction.abs().dot(Vec3::Y) > 0.95 {
        Vec3::Z
    } else {
        Vec3::Y
    };

    let view = Mat4::look_at_rh(light, SHADOW_FOCUS, up);
    let projection = Mat4::perspective_rh(SHADOW_FOV, 1.0, SHADOW_NEAR, SHADOW_FAR);
    projection * view
}

/// Renders light-space depth into an owned depth target.
///
/// The target is cleared on every invocation, so its contents only ever
/// describe the most recent call.
#[derive(Debug)]
pub struct ShadowPass {
    target: TargetHandle,
    size: u32,
    technique: DepthOnly,
}

impl ShadowPass {
    pub fn new(gfx: &mut dyn RenderDevice, size: u32) -> Result<Self, RenderError> {
        let target = gfx.create_target(TargetDescriptor::depth("ShadowMap", size))?;
        log::info!("Shadow map: {}x{}", size, size);
        Ok(Self {
            target,
            size,
            technique: DepthOnly,
        })
    }

    pub fn shadow_map(&self) -> TargetHandle {
        self.target
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Leaves the shadow target bound; callers rebind their own destination.
    pub fn render<'a>(
        &self,
        gfx: &mut dyn RenderDevice,
        light: &LightSource,
        casters: impl IntoIterator<Item = &'a Drawable>,
    ) -> FrameUniforms {
        gfx.bind_target(RenderTarget::Depth(self.target));
        gfx.clear(ClearFlags::DEPTH, [0.0; 4]);

        let view_proj = light_view_proj(light.position());
        let frame = FrameUniforms::from_light(light.position(), view_proj);

        let mut count = 0usize;
        for drawable in casters {
            drawable.draw_with(&self.technique, gfx, &frame);
            count += 1;
        }
        log::trace!("Shadow pass: {} casters", count);
        frame
    }

    pub fn release(&self, gfx: &mut dyn RenderDevice) {
        gfx.release_target(self.target);
    }
}

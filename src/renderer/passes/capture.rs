use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3};

use crate::renderer::passes::sky::SkyBackdrop;
use crate::renderer::{
    ClearFlags, CubeFace, FrameUniforms, RenderDevice, RenderError, RenderTarget, TargetDescriptor,
    TargetHandle,
};
use crate::scene::SceneObjects;

const CAPTURE_NEAR: f32 = 0.1;
const CAPTURE_FAR: f32 = 100.0;
pub const CAPTURE_CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// What a capture needs to see for one frame.
pub struct CaptureView<'a> {
    pub objects: &'a SceneObjects,
    pub sky: &'a SkyBackdrop,
    /// Uniforms of the frame's shadow pass, for shadow-sampling drawables.
    pub light: &'a FrameUniforms,
}

/// Produces the cube map the reflective object samples.
pub trait EnvironmentCapture {
    fn environment_map(&self) -> TargetHandle;

    /// Re-renders the scene around the reflective object. Leaves one of the
    /// cube faces bound.
    fn update(&mut self, gfx: &mut dyn RenderDevice, view: &CaptureView<'_>);

    fn release(&self, gfx: &mut dyn RenderDevice);
}

/// View-projection for one cube face seen from `origin`.
///
/// Left-handed so the rendered faces line up with cube-map sampling
/// directions.
pub fn face_view_proj(origin: Vec3, face: CubeFace) -> Mat4 {
    let projection = Mat4::perspective_lh(FRAC_PI_2, 1.0, CAPTURE_NEAR, CAPTURE_FAR);
    projection * Mat4::look_to_lh(origin, face.direction(), face.up())
}

/// Six-face capture centred on the reflective object's current position.
#[derive(Debug)]
pub struct CubeCapture {
    target: TargetHandle,
    origin: Option<Vec3>,
}

impl CubeCapture {
    pub fn new(gfx: &mut dyn RenderDevice, size: u32) -> Result<Self, RenderError> {
        let target = gfx.create_target(TargetDescriptor::color_cube("EnvironmentMap", size))?;
        log::info!("Environment map: 6x{}x{}", size, size);
        Ok(Self {
            target,
            origin: None,
        })
    }
}

impl EnvironmentCapture for CubeCapture {
    fn environment_map(&self) -> TargetHandle {
        self.target
    }

    fn update(&mut self, gfx: &mut dyn RenderDevice, view: &CaptureView<'_>) {
        let origin = view.objects.reflective.world_position();
        if self.origin != Some(origin) {
            log::debug!("Capturing environment around {:?}", origin);
        }
        self.origin = Some(origin);

        for face in CubeFace::ALL {
            gfx.bind_target(RenderTarget::CubeFace(self.target, face));
            gfx.clear(ClearFlags::COLOR | ClearFlags::DEPTH, CAPTURE_CLEAR_COLOR);

            let frame = view.light.with_view(face_view_proj(origin, face), origin);
            view.sky.draw(gfx, &frame);
            for drawable in view.objects.reflected() {
                drawable.draw(gfx, &frame);
            }
        }
    }

    fn release(&self, gfx: &mut dyn RenderDevice) {
        gfx.release_target(self.target);
    }
}

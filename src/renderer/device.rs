// renderer/device.rs
use bitflags::bitflags;
use glam::Vec3;
use thiserror::Error;

use crate::asset::{Handle, Mesh, MeshHandle};
use crate::renderer::uniforms::DrawUniform;

bitflags! {
    /// Buffers reset by [`RenderDevice::clear`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u8 {
        const COLOR = 0b01;
        const DEPTH = 0b10;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// Single depth layer, sampleable after it has been rendered.
    Depth,
    /// Six colour faces plus a shared depth buffer.
    ColorCube,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    pub label: String,
    pub kind: TargetKind,
    pub size: u32,
}

impl TargetDescriptor {
    pub fn depth(label: impl Into<String>, size: u32) -> Self {
        Self {
            label: label.into(),
            kind: TargetKind::Depth,
            size,
        }
    }

    pub fn color_cube(label: impl Into<String>, size: u32) -> Self {
        Self {
            label: label.into(),
            kind: TargetKind::ColorCube,
            size,
        }
    }
}

pub type TargetHandle = Handle<TargetDescriptor>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// Array layer of this face in a cube texture.
    pub fn layer(self) -> u32 {
        self as u32
    }

    pub fn direction(self) -> Vec3 {
        match self {
            CubeFace::PositiveX => Vec3::X,
            CubeFace::NegativeX => Vec3::NEG_X,
            CubeFace::PositiveY => Vec3::Y,
            CubeFace::NegativeY => Vec3::NEG_Y,
            CubeFace::PositiveZ => Vec3::Z,
            CubeFace::NegativeZ => Vec3::NEG_Z,
        }
    }

    /// Up vector for a left-handed look-to matrix so that the rendered face
    /// matches cube-map sampling orientation.
    pub fn up(self) -> Vec3 {
        match self {
            CubeFace::PositiveY => Vec3::NEG_Z,
            CubeFace::NegativeY => Vec3::Z,
            _ => Vec3::Y,
        }
    }
}

/// Destination for subsequent clears and draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    Screen,
    Depth(TargetHandle),
    CubeFace(TargetHandle, CubeFace),
}

impl RenderTarget {
    pub fn has_color(self) -> bool {
        !matches!(self, RenderTarget::Depth(_))
    }

    pub fn handle(self) -> Option<TargetHandle> {
        match self {
            RenderTarget::Screen => None,
            RenderTarget::Depth(handle) | RenderTarget::CubeFace(handle, _) => Some(handle),
        }
    }
}

/// Shader program selected by a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Program {
    Lit,
    ShadowLit,
    Reflective,
    DepthOnly,
    Sky,
    DepthOverlay,
}

impl Program {
    pub fn writes_color(self) -> bool {
        !matches!(self, Program::DepthOnly)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub program: Program,
    pub mesh: MeshHandle,
    pub uniforms: DrawUniform,
    /// Off-screen target sampled by the program, if any.
    pub texture: Option<TargetHandle>,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot allocate {kind:?} target {label:?} of size {size}: {reason}")]
    TargetAllocation {
        label: String,
        kind: TargetKind,
        size: u32,
        reason: String,
    },
    #[error("unknown render target {0:?}")]
    UnknownTarget(TargetHandle),
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable graphics adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to create graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

/// The graphics context the frame composer drives.
///
/// The model is a bound destination plus a blend toggle: `bind_target`
/// selects where `clear` and `draw` land and `set_blend` switches alpha
/// blending for the draws that follow. Work is only guaranteed to reach the
/// GPU on `present` (screen) or `flush` (off-screen only).
pub trait RenderDevice {
    fn upload_mesh(&mut self, mesh: &Mesh) -> MeshHandle;

    fn create_target(&mut self, descriptor: TargetDescriptor) -> Result<TargetHandle, RenderError>;

    fn release_target(&mut self, target: TargetHandle);

    /// Pixel size of a destination; `(0, 0)` for unknown targets.
    fn target_size(&self, target: RenderTarget) -> (u32, u32);

    fn bind_target(&mut self, target: RenderTarget);

    fn active_target(&self) -> RenderTarget;

    fn clear(&mut self, flags: ClearFlags, color: [f32; 4]);

    fn set_blend(&mut self, enabled: bool);

    fn blend_enabled(&self) -> bool;

    fn draw(&mut self, call: &DrawCall);

    /// Submits recorded off-screen work without presenting.
    fn flush(&mut self) -> Result<(), RenderError>;

    /// Submits everything recorded and shows the screen image.
    fn present(&mut self) -> Result<(), RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_faces_are_orthonormal_to_their_up_vectors() {
        for face in CubeFace::ALL {
            assert!(face.direction().dot(face.up()).abs() < 1e-6, "{face:?}");
        }
        let layers: Vec<u32> = CubeFace::ALL.iter().map(|f| f.layer()).collect();
        assert_eq!(layers, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn depth_targets_have_no_color() {
        let handle = TargetHandle::new(0);
        assert!(!RenderTarget::Depth(handle).has_color());
        assert!(RenderTarget::CubeFace(handle, CubeFace::PositiveX).has_color());
        assert!(RenderTarget::Screen.has_color());
        assert_eq!(RenderTarget::Screen.handle(), None);
    }
}

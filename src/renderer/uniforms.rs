// renderer/uniforms.rs
use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};

/// Per-draw uniform block shared by every program.
///
/// Matches `struct Draw` in the WGSL sources: four matrices followed by three
/// `vec4`s, 304 bytes with no implicit padding.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, PartialEq, Debug)]
pub struct DrawUniform {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub light_pos: [f32; 4],
    pub base_color: [f32; 4],
}

impl DrawUniform {
    pub fn new(model: Mat4, color: [f32; 4], frame: &FrameUniforms) -> Self {
        let normal_matrix = Mat4::from_mat3(Mat3::from_mat4(model).inverse().transpose());
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
            view_proj: frame.view_proj.to_cols_array_2d(),
            light_view_proj: frame.light_view_proj.to_cols_array_2d(),
            camera_pos: frame.camera_position.extend(1.0).to_array(),
            light_pos: frame.light_position.extend(1.0).to_array(),
            base_color: color,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Matrices and positions that stay fixed for one viewpoint of one pass.
///
/// Techniques combine these with a drawable's own transform to fill in a
/// [`DrawUniform`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameUniforms {
    pub view_proj: Mat4,
    pub camera_position: Vec3,
    pub light_position: Vec3,
    pub light_view_proj: Mat4,
}

impl FrameUniforms {
    pub fn new(
        view_proj: Mat4,
        camera_position: Vec3,
        light_position: Vec3,
        light_view_proj: Mat4,
    ) -> Self {
        Self {
            view_proj,
            camera_position,
            light_position,
            light_view_proj,
        }
    }

    /// Uniforms for rendering from the light itself.
    pub fn from_light(light_position: Vec3, light_view_proj: Mat4) -> Self {
        Self::new(light_view_proj, light_position, light_position, light_view_proj)
    }

    /// Same light, different viewpoint.
    pub fn with_view(&self, view_proj: Mat4, camera_position: Vec3) -> Self {
        Self {
            view_proj,
            camera_position,
            ..*self
        }
    }
}

use glam::{Mat3, Mat4, Vec3};

use crate::renderer::Vertex;

/// CPU-side mesh part as produced by a model loader.
///
/// A render device turns it into GPU buffers with
/// [`RenderDevice::upload_mesh`](crate::renderer::RenderDevice::upload_mesh);
/// the returned handle is what drawables hold on to.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub name: Option<String>,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// Base colour used by the lit programs.
    pub color: [f32; 4],
}

pub const DEFAULT_MESH_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            name: None,
            vertices,
            indices,
            color: DEFAULT_MESH_COLOR,
        }
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Bakes `matrix` into positions and normals.
    pub fn transformed(mut self, matrix: Mat4) -> Self {
        let normal_matrix = Mat3::from_mat4(matrix).inverse().transpose();
        for vertex in &mut self.vertices {
            vertex.pos = matrix.transform_point3(Vec3::from(vertex.pos)).to_array();
            vertex.normal = (normal_matrix * Vec3::from(vertex.normal))
                .normalize_or_zero()
                .to_array();
        }
        self
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

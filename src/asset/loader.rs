// asset/loader.rs
use std::f32::consts::PI;
use std::path::{Path, PathBuf};

use glam::{Mat4, Vec3};
use thiserror::Error;

use crate::asset::Mesh;
use crate::renderer::primitives::{cube_mesh, quad_mesh, sphere_mesh};
use crate::renderer::Vertex;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("model file {0:?} not found")]
    NotFound(PathBuf),
    #[error("failed to import glTF {path:?}: {source}")]
    Gltf {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },
    #[error("{path:?}: mesh part {part} has no {attribute}")]
    MissingAttribute {
        path: PathBuf,
        part: usize,
        attribute: &'static str,
    },
    #[error("{0:?} contains no mesh parts")]
    Empty(PathBuf),
    #[error("no placeholder geometry for model {0:?}")]
    UnknownPlaceholder(String),
}

/// Source of mesh parts for a model path.
///
/// Parts come back in a stable order so callers may slice off leading parts
/// (the tiger drops its base part with `parts[1..]`).
pub trait ModelLoader {
    fn load_model(&self, path: &Path) -> Result<Vec<Mesh>, AssetError>;
}

/// Loads every primitive of every mesh in a glTF document as one part.
#[derive(Debug, Default, Clone, Copy)]
pub struct GltfLoader;

impl ModelLoader for GltfLoader {
    fn load_model(&self, path: &Path) -> Result<Vec<Mesh>, AssetError> {
        if !path.exists() {
            return Err(AssetError::NotFound(path.to_path_buf()));
        }

        log::info!("Loading model {:?}", path);
        let (document, buffers, _images) = gltf::import(path).map_err(|source| AssetError::Gltf {
            path: path.to_path_buf(),
            source,
        })?;

        let mut parts = Vec::new();
        for mesh in document.meshes() {
            for primitive in mesh.primitives() {
                let part = parts.len();
                let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

                let positions = reader
                    .read_positions()
                    .ok_or_else(|| AssetError::MissingAttribute {
                        path: path.to_path_buf(),
                        part,
                        attribute: "positions",
                    })?
                    .collect::<Vec<_>>();

                let normals = reader
                    .read_normals()
                    .map(|n| n.collect::<Vec<_>>())
                    .unwrap_or_else(|| vec![[0.0, 1.0, 0.0]; positions.len()]);

                let uvs = reader
                    .read_tex_coords(0)
                    .map(|uv| uv.into_f32().collect::<Vec<_>>())
                    .unwrap_or_else(|| vec![[0.0, 0.0]; positions.len()]);

                let indices = reader
                    .read_indices()
                    .ok_or_else(|| AssetError::MissingAttribute {
                        path: path.to_path_buf(),
                        part,
                        attribute: "indices",
                    })?
                    .into_u32()
                    .collect::<Vec<_>>();

                let vertices = positions
                    .iter()
                    .zip(normals.iter())
                    .zip(uvs.iter())
                    .map(|((pos, normal), uv)| Vertex {
                        pos: *pos,
                        normal: *normal,
                        uv: *uv,
                    })
                    .collect::<Vec<_>>();

                log::trace!(
                    "  part {}: {} vertices, {} indices",
                    part,
                    vertices.len(),
                    indices.len()
                );

                let color = primitive.material().pbr_metallic_roughness().base_color_factor();
                let mut loaded = Mesh::new(vertices, indices).with_color(color);
                loaded.name = mesh.name().map(str::to_owned);
                parts.push(loaded);
            }
        }

        if parts.is_empty() {
            return Err(AssetError::Empty(path.to_path_buf()));
        }

        log::debug!("{:?}: {} mesh parts", path, parts.len());
        Ok(parts)
    }
}

/// Built-in stand-ins for the jungle models, keyed by file stem.
///
/// Lets the viewer start without model files and gives tests a loader that
/// never touches the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderLoader;

impl ModelLoader for PlaceholderLoader {
    fn load_model(&self, path: &Path) -> Result<Vec<Mesh>, AssetError> {
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default();

        let parts = match stem {
            "ground" => vec![quad_mesh()
                .transformed(Mat4::from_scale(Vec3::new(30.0, 1.0, 30.0)))
                .with_color(GROUND)],
            "water" => vec![quad_mesh()
                .transformed(
                    Mat4::from_translation(Vec3::new(0.0, 0.05, 0.0))
                        * Mat4::from_scale(Vec3::splat(6.0)),
                )
                .with_color(WATER)],
            "single_tree" => tree(1),
            "double_tree" => tree(2),
            "triple_tree" => tree(3),
            "hippo" => vec![sphere_mesh(24, 12)
                .transformed(Mat4::from_scale(Vec3::new(2.0, 1.0, 1.2)))
                .with_color([0.45, 0.42, 0.5, 1.0])],
            "tiger" => vec![
                cube_mesh()
                    .transformed(Mat4::from_scale(Vec3::new(4.0, 0.1, 4.0)))
                    .with_color(GROUND),
                cube_mesh()
                    .transformed(Mat4::from_scale(Vec3::new(3.0, 1.2, 1.2)))
                    .with_color(TIGER),
                sphere_mesh(16, 8)
                    .transformed(
                        Mat4::from_translation(Vec3::new(2.0, 0.6, 0.0))
                            * Mat4::from_scale(Vec3::splat(0.8)),
                    )
                    .with_color(TIGER),
                cube_mesh()
                    .transformed(
                        Mat4::from_translation(Vec3::new(-2.0, 0.4, 0.0))
                            * Mat4::from_scale(Vec3::new(1.5, 0.15, 0.15)),
                    )
                    .with_color(TIGER),
            ],
            "aztec" => [(0.5, 3.0, 1.0), (1.5, 1.8, 1.0), (2.3, 0.8, 0.6)]
                .into_iter()
                .map(|(y, width, thickness)| {
                    cube_mesh()
                        .transformed(
                            Mat4::from_translation(Vec3::new(0.0, y, 0.0))
                                * Mat4::from_scale(Vec3::new(width, thickness, width)),
                        )
                        .with_color(STONE)
                })
                .collect(),
            "diamond" => vec![sphere_mesh(4, 2).with_color([0.9, 0.95, 1.0, 1.0])],
            other => return Err(AssetError::UnknownPlaceholder(other.to_owned())),
        };

        Ok(parts
            .into_iter()
            .map(|part| part.with_name(stem))
            .collect())
    }
}

const GROUND: [f32; 4] = [0.36, 0.3, 0.18, 1.0];
const WATER: [f32; 4] = [0.2, 0.4, 0.6, 1.0];
const TIGER: [f32; 4] = [0.9, 0.5, 0.1, 1.0];
const STONE: [f32; 4] = [0.6, 0.58, 0.5, 1.0];

fn tree(trunks: usize) -> Vec<Mesh> {
    let mut parts = Vec::with_capacity(trunks * 2);
    for i in 0..trunks {
        let angle = i as f32 * 2.0 * PI / trunks as f32;
        let offset = if trunks == 1 {
            Vec3::ZERO
        } else {
            Vec3::new(angle.cos(), 0.0, angle.sin()) * 0.8
        };
        parts.push(
            cube_mesh()
                .transformed(
                    Mat4::from_translation(offset + Vec3::new(0.0, 1.5, 0.0))
                        * Mat4::from_scale(Vec3::new(0.3, 3.0, 0.3)),
                )
                .with_color([0.4, 0.26, 0.13, 1.0]),
        );
        parts.push(
            sphere_mesh(12, 6)
                .transformed(
                    Mat4::from_translation(offset + Vec3::new(0.0, 3.5, 0.0))
                        * Mat4::from_scale(Vec3::splat(1.2)),
                )
                .with_color([0.15, 0.5, 0.15, 1.0]),
        );
    }
    parts
}

use super::vertex::{v, Vertex};
use crate::asset::Mesh;
use std::f32::consts::PI;

pub fn sphere_mesh(segments: u32, rings: u32) -> Mesh {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for ring in 0..=rings {
        let phi = PI * ring as f32 / rings as f32;
        let y = phi.cos();
        let ring_radius = phi.sin();

        for segment in 0..=segments {
            let theta = 2.0 * PI * segment as f32 / segments as f32;
            let x = ring_radius * theta.cos();
            let z = ring_radius * theta.sin();

            // unit sphere: position doubles as normal
            let u = segment as f32 / segments as f32;
            let tex_v = ring as f32 / rings as f32;
            vertices.push(v([x, y, z], [x, y, z], [u, tex_v]));
        }
    }

    for ring in 0..rings {
        for segment in 0..segments {
            let current = ring * (segments + 1) + segment;
            let next = current + segments + 1;

            indices.extend_from_slice(&[current, next, current + 1]);
            indices.extend_from_slice(&[current + 1, next, next + 1]);
        }
    }

    Mesh::new(vertices, indices)
}

/// Unit cube centred on the origin, four vertices per face.
pub fn cube_mesh() -> Mesh {
    // (normal, tangent-u, tangent-v) per face
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];
    const CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (-1.0, 1.0), (1.0, 1.0), (1.0, -1.0)];

    let mut vertices = Vec::with_capacity(24);
    for (n, t, b) in FACES {
        for (su, sv) in CORNERS {
            let pos = [
                0.5 * (n[0] + su * t[0] + sv * b[0]),
                0.5 * (n[1] + su * t[1] + sv * b[1]),
                0.5 * (n[2] + su * t[2] + sv * b[2]),
            ];
            vertices.push(v(pos, n, [(su + 1.0) * 0.5, (1.0 - sv) * 0.5]));
        }
    }

    let indices = (0..6u32)
        .flat_map(|f| {
            let o = f * 4;
            [o, o + 1, o + 2, o, o + 2, o + 3]
        })
        .collect::<Vec<_>>();

    Mesh::new(vertices, indices)
}

/// Unit quad in the XZ plane facing +Y.
pub fn quad_mesh() -> Mesh {
    let up = [0.0, 1.0, 0.0];
    let vertices = vec![
        v([-0.5, 0.0, -0.5], up, [0.0, 0.0]),
        v([-0.5, 0.0, 0.5], up, [0.0, 1.0]),
        v([0.5, 0.0, 0.5], up, [1.0, 1.0]),
        v([0.5, 0.0, -0.5], up, [1.0, 0.0]),
    ];
    Mesh::new(vertices, vec![0, 1, 2, 0, 2, 3])
}

/// Two-triangle quad covering clip space, used by screen-space overlays.
pub fn screen_quad_mesh() -> Mesh {
    let forward = [0.0, 0.0, 1.0];
    let vertices: Vec<Vertex> = vec![
        v([-1.0, -1.0, 0.0], forward, [0.0, 1.0]),
        v([1.0, -1.0, 0.0], forward, [1.0, 1.0]),
        v([1.0, 1.0, 0.0], forward, [1.0, 0.0]),
        v([-1.0, 1.0, 0.0], forward, [0.0, 0.0]),
    ];
    Mesh::new(vertices, vec![0, 1, 2, 0, 2, 3])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_counts_look_right() {
        let cube = cube_mesh();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
    }

    #[test]
    fn cube_vertices_lie_on_the_unit_cube() {
        for vertex in cube_mesh().vertices {
            let max = vertex.pos.iter().fold(0.0f32, |acc, c| acc.max(c.abs()));
            assert!((max - 0.5).abs() < 1e-6, "{:?}", vertex.pos);
        }
    }

    #[test]
    fn sphere_indices_stay_in_range() {
        let sphere = sphere_mesh(8, 4);
        assert_eq!(sphere.vertices.len(), 9 * 5);
        assert!(sphere
            .indices
            .iter()
            .all(|&i| (i as usize) < sphere.vertices.len()));
    }
}

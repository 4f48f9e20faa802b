use std::f32::consts::PI;
use std::rc::Rc;

use glam::{Mat4, Vec3};
use rand::Rng;

use crate::renderer::ShadingTechnique;
use crate::scene::drawable::{Model, ObjectGroup};

/// Half-width of the square candidates are drawn from.
pub const DEFAULT_EXTENT: f32 = 15.0;

/// True inside the parabolic pond: `-0.2 (x - 3)^2 >= y`.
///
/// The boundary belongs to the water, so `(3, 0)` is excluded.
pub fn in_water(x: f32, y: f32) -> bool {
    -0.2 * (x - 3.0).powi(2) >= y
}

/// Places a vegetation model at ground-plane coordinates `(x, y)`.
pub fn vegetation_transform(x: f32, y: f32) -> Mat4 {
    Mat4::from_rotation_y(PI)
        * Mat4::from_scale(Vec3::new(0.5, 0.7, 0.5))
        * Mat4::from_translation(Vec3::new(x, -5.0, y))
}

/// Rejection-samples vegetation placements.
///
/// Runs `attempts` rounds; each round draws one candidate per variant from
/// `[-extent, extent]^2` and keeps it unless `excluded` says otherwise.
/// Rejected candidates are not retried, so a variant ends up with anywhere
/// from zero to `attempts` instances.
pub fn scatter<R, F>(
    rng: &mut R,
    variants: &[Model],
    attempts: usize,
    extent: f32,
    excluded: F,
    technique: &Rc<dyn ShadingTechnique>,
) -> Vec<ObjectGroup>
where
    R: Rng + ?Sized,
    F: Fn(f32, f32) -> bool,
{
    let mut placed = Vec::new();
    let mut rejected = 0usize;

    for _ in 0..attempts {
        for variant in variants {
            let x = rng.gen_range(-extent..=extent);
            let y = rng.gen_range(-extent..=extent);
            if excluded(x, y) {
                rejected += 1;
                continue;
            }
            placed.push(variant.instantiate(technique, vegetation_transform(x, y)));
        }
    }

    log::debug!(
        "Scattered {} vegetation groups ({} candidates rejected)",
        placed.len(),
        rejected
    );
    placed
}

use std::path::Path;
use std::rc::Rc;

use jungle_viewer::asset::{ModelLoader, PlaceholderLoader};
use jungle_viewer::renderer::{HeadlessDevice, PlainLit, ShadingTechnique};
use jungle_viewer::scene::scatter::DEFAULT_EXTENT;
use jungle_viewer::scene::{in_water, scatter, Model, ObjectGroup};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn tree(gfx: &mut HeadlessDevice) -> Model {
    let meshes = PlaceholderLoader
        .load_model(Path::new("single_tree.gltf"))
        .unwrap();
    Model::upload(gfx, "single_tree", &meshes)
}

fn plain() -> Rc<dyn ShadingTechnique> {
    Rc::new(PlainLit)
}

/// Recovers the sampled ground coordinates from a placed group.
fn ground_coords(group: &ObjectGroup) -> (f32, f32) {
    let origin = group.drawables()[0].world_position();
    (-2.0 * origin.x, -2.0 * origin.z)
}

#[test]
fn pond_predicate_boundary() {
    for x in [-12.0_f32, -4.0, 0.0, 3.0, 5.5, 14.0] {
        let edge = -0.2 * (x - 3.0).powi(2);
        assert!(in_water(x, edge), "({x}, {edge}) is on the boundary");
        assert!(in_water(x, edge - 0.01));
        assert!(!in_water(x, edge + 0.01));
    }
    assert!(in_water(3.0, 0.0));
}

#[test]
fn placed_vegetation_never_lands_in_the_water() {
    let mut gfx = HeadlessDevice::new(16, 16);
    let variants = [tree(&mut gfx)];
    let mut rng = SmallRng::seed_from_u64(11);

    let placed = scatter(&mut rng, &variants, 200, DEFAULT_EXTENT, in_water, &plain());

    assert!(!placed.is_empty());
    for group in &placed {
        let (x, y) = ground_coords(group);
        assert!(x.abs() <= DEFAULT_EXTENT + 1e-3 && y.abs() <= DEFAULT_EXTENT + 1e-3);
        // Allow for float error in recovering the coordinates.
        assert!(!in_water(x, y + 1e-3), "tree placed in water at ({x}, {y})");
    }
}

#[test]
fn placement_count_never_exceeds_attempts() {
    let mut gfx = HeadlessDevice::new(16, 16);
    let variants = [tree(&mut gfx)];

    for seed in 0..20 {
        let mut rng = SmallRng::seed_from_u64(seed);
        for attempts in [0, 1, 5, 30] {
            let placed = scatter(&mut rng, &variants, attempts, DEFAULT_EXTENT, in_water, &plain());
            assert!(placed.len() <= attempts);
        }
    }
}

#[test]
fn rejected_candidates_are_not_retried() {
    let mut gfx = HeadlessDevice::new(16, 16);
    let variants = [tree(&mut gfx)];
    let mut rng = SmallRng::seed_from_u64(3);

    // Everything left of x = 0 is rejected; roughly half the attempts survive.
    let placed = scatter(&mut rng, &variants, 400, DEFAULT_EXTENT, |x, _| x < 0.0, &plain());

    assert!(placed.len() < 400);
    assert!(placed.len() > 100);
    assert!(placed.iter().all(|group| ground_coords(group).0 >= -1e-3));
}

#[test]
fn same_seed_gives_the_same_layout() {
    let mut gfx = HeadlessDevice::new(16, 16);
    let variants = [tree(&mut gfx)];

    let layout = |seed| {
        let mut rng = SmallRng::seed_from_u64(seed);
        scatter(&mut rng, &variants, 25, DEFAULT_EXTENT, in_water, &plain())
            .iter()
            .map(ground_coords)
            .collect::<Vec<_>>()
    };

    assert_eq!(layout(42), layout(42));
}

#[test]
fn every_group_keeps_all_parts_of_its_model() {
    let mut gfx = HeadlessDevice::new(16, 16);
    let meshes = PlaceholderLoader
        .load_model(Path::new("triple_tree.gltf"))
        .unwrap();
    let variants = [Model::upload(&mut gfx, "triple_tree", &meshes)];
    let mut rng = SmallRng::seed_from_u64(5);

    let placed = scatter(&mut rng, &variants, 10, DEFAULT_EXTENT, |_, _| false, &plain());

    assert_eq!(placed.len(), 10);
    assert!(placed.iter().all(|group| group.len() == meshes.len()));
}

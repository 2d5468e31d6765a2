mod common;

use common::{capek_descriptors, disk_target, noise_target, planar_directions, random_tracker};
use remat_anneal::CostFunction;
use remat_core::{Descriptor, Direction, PhaseGrid, Tracker};
use remat_track::TrackedGrid;

#[test]
fn euclid_costs_are_symmetric_and_zero_on_identical_trackers() {
    let a = disk_target(20, 8);
    let b = noise_target(20, 8, 301);
    for cost in [CostFunction::euclid_mean(), CostFunction::euclid_directional()] {
        let forward = cost.evaluate(&a, &b).unwrap();
        let backward = cost.evaluate(&b, &a).unwrap();
        assert!(forward > 0.0);
        assert!((forward - backward).abs() <= 1e-12 * forward);
        assert_eq!(cost.evaluate(&a, &a).unwrap(), 0.0);
    }
}

#[test]
fn directional_dominates_mean_distance() {
    // Averaging across directions can only cancel structure, never add it.
    let a = disk_target(20, 8);
    let b = noise_target(20, 8, 302);
    let mean = CostFunction::euclid_mean().evaluate(&a, &b).unwrap();
    let directional = CostFunction::euclid_directional().evaluate(&a, &b).unwrap();
    assert!(directional >= mean);
}

#[test]
fn weighted_costs_start_at_the_descriptor_count() {
    let a = disk_target(20, 8);
    let b = noise_target(20, 8, 303);
    let descriptors = a.descriptors().len() as f64;

    let mean = CostFunction::euclid_mean_weighted(&a, &b).unwrap();
    let value = mean.evaluate(&a, &b).unwrap();
    assert!((value - descriptors).abs() < 1e-9);

    let directional = CostFunction::euclid_directional_weighted(&a, &b).unwrap();
    let value = directional.evaluate(&a, &b).unwrap();
    assert!((value - descriptors).abs() < 1e-9);
}

#[test]
fn weighted_factories_reject_zero_baselines() {
    let a = disk_target(16, 6);
    let err = CostFunction::euclid_mean_weighted(&a, &a).unwrap_err();
    assert_eq!(err.info().code, "zero-baseline");
}

#[test]
fn capek_cost_gates_the_void_path_term() {
    let a = random_tracker(20, 8, 304);
    let b = noise_target(20, 8, 305);
    let cost = CostFunction::capek(&a, &b, 0.6).unwrap();

    let s2 = CostFunction::euclid_directional();
    let primary_only = {
        // Primary objective: solid two-point plus solid lineal-path.
        let full = s2.evaluate(&a, &b).unwrap();
        let void_path = directional_for(&a, &b, Descriptor::lineal_path(0));
        full - void_path
    };
    let total = cost.evaluate(&a, &b).unwrap();
    let void_path = directional_for(&a, &b, Descriptor::lineal_path(0));
    // The gated term sits strictly between zero and the full void distance.
    assert!(total > primary_only);
    assert!(total < primary_only + void_path);
}

#[test]
fn capek_requires_its_descriptors() {
    let slim = TrackedGrid::new(
        PhaseGrid::new(&[8, 8], true).unwrap(),
        vec![Descriptor::two_point(0)],
        vec![Direction::X],
        4,
    )
    .unwrap();
    let err = CostFunction::capek(&slim, &slim, 0.5).unwrap_err();
    assert_eq!(err.info().code, "missing-descriptor");
}

#[test]
fn generalized_capek_matches_plain_capek_on_the_void_path_control() {
    let a = random_tracker(18, 6, 306);
    let b = disk_target(18, 6);
    let plain = CostFunction::capek(&a, &b, 0.4).unwrap();
    let general =
        CostFunction::generalized_capek(&a, &b, &[(Descriptor::lineal_path(0), 0.4)]).unwrap();
    let direct = plain.evaluate(&a, &b).unwrap();
    let generalized = general.evaluate(&a, &b).unwrap();
    assert!((direct - generalized).abs() <= 1e-12 * direct.max(1.0));
}

#[test]
fn generalized_capek_validates_controls() {
    let a = random_tracker(12, 4, 307);
    let b = disk_target(12, 4);
    let err = CostFunction::generalized_capek(&a, &b, &[(Descriptor::lineal_path(0), 1.5)])
        .unwrap_err();
    assert_eq!(err.info().code, "invalid-eta");

    let err = CostFunction::generalized_capek(
        &a,
        &b,
        &[
            (Descriptor::lineal_path(0), 0.5),
            (Descriptor::lineal_path(0), 0.2),
        ],
    )
    .unwrap_err();
    assert_eq!(err.info().code, "duplicate-descriptor");
}

#[test]
fn mismatched_trackers_are_rejected() {
    let a = disk_target(16, 6);
    let slim = TrackedGrid::new(
        PhaseGrid::new(&[16, 16], true).unwrap(),
        vec![Descriptor::two_point(0)],
        planar_directions(),
        6,
    )
    .unwrap();
    let err = CostFunction::euclid_mean().evaluate(&a, &slim).unwrap_err();
    assert_eq!(err.info().code, "descriptor-mismatch");

    let narrow = TrackedGrid::new(
        PhaseGrid::new(&[16, 16], true).unwrap(),
        capek_descriptors(),
        vec![Direction::X, Direction::Y],
        6,
    )
    .unwrap();
    let err = CostFunction::euclid_directional()
        .evaluate(&a, &narrow)
        .unwrap_err();
    assert_eq!(err.info().code, "direction-mismatch");
}

fn directional_for(a: &TrackedGrid, b: &TrackedGrid, descriptor: Descriptor) -> f64 {
    let data_a = a.correlation(descriptor).unwrap();
    let data_b = b.correlation(descriptor).unwrap();
    data_a
        .iter()
        .map(|(direction, vector)| {
            let other = data_b.for_direction(direction).unwrap();
            vector
                .iter()
                .zip(other.iter())
                .map(|(&x, &y)| (x - y) * (x - y))
                .sum::<f64>()
        })
        .sum()
}

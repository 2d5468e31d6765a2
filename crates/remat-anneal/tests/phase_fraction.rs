mod common;

use common::{disk_target, random_tracker};
use remat_anneal::{run, Cooldown, CostFunction, Modifier, Sampler};
use remat_anneal::Furnace;
use remat_core::{RngHandle, Tracker};

#[test]
fn flip_moves_the_phase_count_by_one() {
    let mut tracker = random_tracker(12, 4, 201);
    let mut modifier = Modifier::flipper(Sampler::uniform());
    let mut rng = RngHandle::from_seed(202);
    for _ in 0..500 {
        let before = tracker.grid().phase_count(1) as i64;
        let proposal = modifier.modify(&mut tracker, &mut rng).unwrap();
        let after = tracker.grid().phase_count(1) as i64;
        assert_eq!((after - before).abs(), 1);
        modifier.reject(&mut tracker, proposal).unwrap();
    }
}

#[test]
fn swap_preserves_the_phase_count_exactly() {
    let mut tracker = random_tracker(12, 4, 203);
    let expected = tracker.grid().phase_count(1);
    let mut modifier = Modifier::swapper(Sampler::uniform());
    let mut rng = RngHandle::from_seed(204);
    for _ in 0..500 {
        let _proposal = modifier.modify(&mut tracker, &mut rng).unwrap();
        assert_eq!(tracker.grid().phase_count(1), expected);
    }
}

#[test]
fn swapper_annealing_run_conserves_the_phase_fraction() {
    let target = disk_target(24, 8);
    let mut rng = RngHandle::from_seed(205);
    let furnace = Furnace::with_random_system(target, None, 1.0e-6, &mut rng).unwrap();
    let starting = furnace.system().grid().phase_count(1);

    let cost = CostFunction::euclid_mean();
    let mut modifier = Modifier::swapper(Sampler::interface());
    let mut cooldown = Cooldown::exponential(0.999999).unwrap();
    let (furnace, summary) = run(
        furnace,
        &cost,
        &mut modifier,
        &mut cooldown,
        &mut rng,
        5_000,
        250,
    )
    .unwrap();

    assert_eq!(furnace.steps(), 5_000);
    assert_eq!(furnace.system().grid().phase_count(1), starting);
    assert!(summary.final_cost <= summary.initial_cost);
}

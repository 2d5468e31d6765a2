mod common;

use common::random_tracker;
use remat_anneal::{dpn_histogram, Cooldown, CostFunction, Furnace, Modifier, Sampler};
use remat_anneal::kernel::step;
use remat_core::{RngHandle, Tracker};

#[test]
fn histogram_tracks_a_long_flip_sequence() {
    let mut tracker = random_tracker(16, 5, 501);
    let mut modifier = Modifier::flipper(Sampler::dpn(tracker.grid(), 2.0).unwrap());
    let mut rng = RngHandle::from_seed(502);
    for _ in 0..1_000 {
        modifier.modify(&mut tracker, &mut rng).unwrap();
    }
    assert_eq!(
        modifier.sampler().histogram().unwrap(),
        dpn_histogram(tracker.grid()).as_slice()
    );
}

#[test]
fn histogram_tracks_swaps_and_interleaved_rejections() {
    let mut tracker = random_tracker(16, 5, 503);
    let mut modifier = Modifier::swapper(Sampler::dpn(tracker.grid(), 1.5).unwrap());
    let mut rng = RngHandle::from_seed(504);
    for trial in 0..1_000 {
        let proposal = modifier.modify(&mut tracker, &mut rng).unwrap();
        if trial % 3 == 0 {
            modifier.reject(&mut tracker, proposal).unwrap();
        }
        assert_eq!(
            modifier.sampler().histogram().unwrap(),
            dpn_histogram(tracker.grid()).as_slice()
        );
    }
}

#[test]
fn histogram_survives_a_metropolis_run() {
    let target = common::disk_target(16, 5);
    let mut rng = RngHandle::from_seed(505);
    let mut furnace = Furnace::with_random_system(target, None, 1.0e-3, &mut rng).unwrap();
    let cost = CostFunction::euclid_directional();
    let mut modifier =
        Modifier::flipper(Sampler::dpn(furnace.system().grid(), 2.0).unwrap());
    let mut cooldown = Cooldown::exponential(0.9999).unwrap();
    for _ in 0..1_000 {
        furnace = step(furnace, &cost, &mut modifier, &mut cooldown, &mut rng).unwrap();
    }
    assert_eq!(
        modifier.sampler().histogram().unwrap(),
        dpn_histogram(furnace.system().grid()).as_slice()
    );
    assert_eq!(furnace.steps(), 1_000);
}

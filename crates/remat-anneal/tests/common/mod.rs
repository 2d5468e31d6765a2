#![allow(dead_code)]

use rand::RngCore;
use remat_core::{Descriptor, Direction, PhaseGrid, RngHandle};
use remat_track::TrackedGrid;

/// Descriptor set the Čapek costs need: solid two-point, solid lineal-path
/// and void lineal-path.
pub fn capek_descriptors() -> Vec<Descriptor> {
    vec![
        Descriptor::two_point(0),
        Descriptor::lineal_path(1),
        Descriptor::lineal_path(0),
    ]
}

/// Planar direction set: both axes plus both diagonals.
pub fn planar_directions() -> Vec<Direction> {
    vec![Direction::X, Direction::Y, Direction::Xy, Direction::Yx]
}

/// Solid disk centered in an otherwise void periodic grid.
pub fn disk_target(extent: usize, length: usize) -> TrackedGrid {
    let mut grid = PhaseGrid::new(&[extent, extent], true).unwrap();
    let center = extent as f64 / 2.0;
    let radius = extent as f64 / 4.0;
    for index in 0..grid.len() {
        let site = grid.site_of(index);
        let dx = site[0] as f64 - center;
        let dy = site[1] as f64 - center;
        if dx * dx + dy * dy <= radius * radius {
            grid.set(index, 1);
        }
    }
    TrackedGrid::new(grid, capek_descriptors(), planar_directions(), length).unwrap()
}

/// Thresholded value noise: a few random plane waves summed and cut at
/// zero, giving a smooth two-phase structure.
pub fn noise_target(extent: usize, length: usize, seed: u64) -> TrackedGrid {
    let mut rng = RngHandle::from_seed(seed);
    let waves: Vec<(f64, f64, f64)> = (0..6)
        .map(|_| {
            let kx = 1.0 + (rng.next_u64() % 3) as f64;
            let ky = 1.0 + (rng.next_u64() % 3) as f64;
            let phase = rng.next_f64() * std::f64::consts::TAU;
            (kx, ky, phase)
        })
        .collect();
    let mut grid = PhaseGrid::new(&[extent, extent], true).unwrap();
    let scale = std::f64::consts::TAU / extent as f64;
    for index in 0..grid.len() {
        let site = grid.site_of(index);
        let value: f64 = waves
            .iter()
            .map(|&(kx, ky, phase)| (scale * (kx * site[0] as f64 + ky * site[1] as f64) + phase).cos())
            .sum();
        grid.set(index, u8::from(value > 0.0));
    }
    TrackedGrid::new(grid, capek_descriptors(), planar_directions(), length).unwrap()
}

/// Uniformly random grid wrapped with the Čapek descriptor set.
pub fn random_tracker(extent: usize, length: usize, seed: u64) -> TrackedGrid {
    let mut rng = RngHandle::from_seed(seed);
    let mut grid = PhaseGrid::new(&[extent, extent], true).unwrap();
    for index in 0..grid.len() {
        grid.set(index, (rng.next_u64() & 1) as u8);
    }
    TrackedGrid::new(grid, capek_descriptors(), planar_directions(), length).unwrap()
}

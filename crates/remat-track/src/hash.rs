//! Canonical hashing of full tracker state.

use remat_core::tracker::{Direction, FunctionKind, Tracker};
use sha2::{Digest, Sha256};

use crate::tracker::TrackedGrid;

/// Computes a canonical SHA-256 hash over the grid and every raw
/// correlation count. Two trackers hash equal exactly when their observable
/// state is identical, which makes the hash the reference witness for
/// rollback exactness.
pub fn state_hash(tracker: &TrackedGrid) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"remat-tracker-state");

    let grid = tracker.grid();
    hasher.update((grid.ndim() as u64).to_le_bytes());
    for &extent in grid.shape() {
        hasher.update((extent as u64).to_le_bytes());
    }
    hasher.update([u8::from(grid.is_periodic())]);
    hasher.update((tracker.correlation_length() as u64).to_le_bytes());
    hasher.update(grid.raw());

    hasher.update((tracker.directions().len() as u64).to_le_bytes());
    for &direction in tracker.directions() {
        hasher.update([direction_tag(direction)]);
    }

    let descriptors = tracker.descriptors();
    hasher.update((descriptors.len() as u64).to_le_bytes());
    for (descriptor, state) in descriptors.iter().zip(tracker.states()) {
        hasher.update([kind_tag(descriptor.kind), descriptor.phase]);
        for counts in state.raw_counts() {
            hasher.update((counts.len() as u64).to_le_bytes());
            for &count in counts {
                hasher.update(count.to_le_bytes());
            }
        }
    }

    format!("{:x}", hasher.finalize())
}

fn kind_tag(kind: FunctionKind) -> u8 {
    match kind {
        FunctionKind::TwoPoint => 0,
        FunctionKind::LinealPath => 1,
    }
}

fn direction_tag(direction: Direction) -> u8 {
    match direction {
        Direction::X => 0,
        Direction::Y => 1,
        Direction::Z => 2,
        Direction::Xy => 3,
        Direction::Yx => 4,
        Direction::Xz => 5,
        Direction::Zx => 6,
        Direction::Yz => 7,
        Direction::Zy => 8,
    }
}

//! Contract presented by correlation trackers.
//!
//! A tracker owns a [`PhaseGrid`] plus a set of spatial correlation
//! statistics and keeps the statistics consistent under single-site writes
//! via an undoable incremental-update protocol. The annealing engine only
//! ever talks to this trait; concrete trackers live outside this crate.

use serde::{Deserialize, Serialize};

use crate::errors::RematError;
use crate::grid::{Phase, PhaseGrid, Site};

/// Correlation function families a tracker may maintain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FunctionKind {
    /// Two-point probability S2: both ends of a lag vector in the phase.
    TwoPoint,
    /// Lineal-path probability L2: an entire segment inside the phase.
    LinealPath,
}

impl FunctionKind {
    fn as_str(&self) -> &'static str {
        match self {
            FunctionKind::TwoPoint => "s2",
            FunctionKind::LinealPath => "l2",
        }
    }
}

/// Identifies one tracked correlation function: a family and the phase it
/// is measured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Descriptor {
    /// Correlation function family.
    pub kind: FunctionKind,
    /// Phase the function is measured for.
    pub phase: Phase,
}

impl Descriptor {
    /// Two-point descriptor for the given phase.
    pub fn two_point(phase: Phase) -> Self {
        Self {
            kind: FunctionKind::TwoPoint,
            phase,
        }
    }

    /// Lineal-path descriptor for the given phase.
    pub fn lineal_path(phase: Phase) -> Self {
        Self {
            kind: FunctionKind::LinealPath,
            phase,
        }
    }

    /// Short label used in error contexts and metric keys, e.g. `s2/0`.
    pub fn label(&self) -> String {
        format!("{}/{}", self.kind.as_str(), self.phase)
    }
}

/// Lattice directions correlations may be measured along.
///
/// Two-letter variants are diagonals: `Xy` steps (+1, +1), `Yx` steps the
/// anti-diagonal (+1, -1), and likewise for the remaining pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// First lattice axis.
    X,
    /// Second lattice axis.
    Y,
    /// Third lattice axis.
    Z,
    /// Main diagonal in the x-y plane.
    Xy,
    /// Anti-diagonal in the x-y plane.
    Yx,
    /// Main diagonal in the x-z plane.
    Xz,
    /// Anti-diagonal in the x-z plane.
    Zx,
    /// Main diagonal in the y-z plane.
    Yz,
    /// Anti-diagonal in the y-z plane.
    Zy,
}

impl Direction {
    /// Integer step of one lag along this direction.
    pub fn step(&self) -> Site {
        match self {
            Direction::X => [1, 0, 0],
            Direction::Y => [0, 1, 0],
            Direction::Z => [0, 0, 1],
            Direction::Xy => [1, 1, 0],
            Direction::Yx => [1, -1, 0],
            Direction::Xz => [1, 0, 1],
            Direction::Zx => [1, 0, -1],
            Direction::Yz => [0, 1, 1],
            Direction::Zy => [0, 1, -1],
        }
    }

    /// True when the direction stays inside an N-dimensional lattice.
    pub fn valid_for(&self, ndim: usize) -> bool {
        self.step()[2] == 0 || ndim == 3
    }

    /// Default direction set for an N-dimensional lattice: the axes plus the
    /// in-plane diagonals.
    pub fn default_set(ndim: usize) -> Vec<Direction> {
        if ndim == 3 {
            vec![
                Direction::X,
                Direction::Y,
                Direction::Z,
                Direction::Xy,
                Direction::Yx,
                Direction::Xz,
                Direction::Zx,
                Direction::Yz,
                Direction::Zy,
            ]
        } else {
            vec![Direction::X, Direction::Y, Direction::Xy, Direction::Yx]
        }
    }
}

/// Per-direction correlation vectors reported by a tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationData {
    directions: Vec<Direction>,
    values: Vec<Vec<f64>>,
}

impl CorrelationData {
    /// Bundles per-direction vectors. All vectors must share one length.
    pub fn new(directions: Vec<Direction>, values: Vec<Vec<f64>>) -> Self {
        debug_assert_eq!(directions.len(), values.len());
        debug_assert!(values.windows(2).all(|pair| pair[0].len() == pair[1].len()));
        Self { directions, values }
    }

    /// Directions the data was measured along, in reporting order.
    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    /// Number of lags per direction vector.
    pub fn len(&self) -> usize {
        self.values.first().map_or(0, Vec::len)
    }

    /// True when no lags were recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Correlation vector for one direction, if measured.
    pub fn for_direction(&self, direction: Direction) -> Option<&[f64]> {
        self.directions
            .iter()
            .position(|&candidate| candidate == direction)
            .map(|slot| self.values[slot].as_slice())
    }

    /// Correlation vector averaged across all directions.
    pub fn mean(&self) -> Vec<f64> {
        let lags = self.len();
        let mut averaged = vec![0.0; lags];
        if self.values.is_empty() {
            return averaged;
        }
        for vector in &self.values {
            for (slot, value) in vector.iter().enumerate() {
                averaged[slot] += value;
            }
        }
        let scale = 1.0 / self.values.len() as f64;
        for value in &mut averaged {
            *value *= scale;
        }
        averaged
    }

    /// Iterates over `(direction, vector)` pairs in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, &[f64])> {
        self.directions
            .iter()
            .copied()
            .zip(self.values.iter().map(Vec::as_slice))
    }
}

/// Grid plus incrementally maintained correlation statistics.
///
/// Implementations must guarantee that `update` followed by `rollback` of
/// the returned token restores both the grid and every correlation vector
/// bitwise, and that an `update`/`rollback` pair is applied with zero
/// intervening mutations.
pub trait Tracker {
    /// Opaque value sufficient to reverse one `update`.
    type Token;

    /// Extents of the underlying grid.
    fn shape(&self) -> &[usize];

    /// Total number of lattice sites.
    fn len(&self) -> usize;

    /// True when the underlying grid holds no sites.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Boundary condition of the underlying grid.
    fn is_periodic(&self) -> bool;

    /// Number of lags tracked per correlation vector.
    fn correlation_length(&self) -> usize;

    /// Read access to the underlying grid.
    fn grid(&self) -> &PhaseGrid;

    /// Reads the phase at a linear index.
    fn read(&self, index: usize) -> Phase;

    /// Writes `value` at `index`, incrementally updating every tracked
    /// correlation, and returns a token reversing the write.
    fn update(&mut self, value: Phase, index: usize) -> Result<Self::Token, RematError>;

    /// Reverses a previous `update`.
    fn rollback(&mut self, token: Self::Token) -> Result<(), RematError>;

    /// Descriptors tracked by this instance, in registration order.
    fn descriptors(&self) -> &[Descriptor];

    /// Directions every descriptor is measured along.
    fn directions(&self) -> &[Direction];

    /// Correlation vectors for one tracked descriptor.
    fn correlation(&self, descriptor: Descriptor) -> Result<CorrelationData, RematError>;

    /// Wraps `grid` into a new tracker inheriting this tracker's
    /// descriptors, directions and correlation length.
    fn construct_like(&self, grid: PhaseGrid) -> Result<Self, RematError>
    where
        Self: Sized;
}

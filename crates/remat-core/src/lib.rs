#![deny(missing_docs)]

//! Core contracts for the remat reconstruction engine.
//!
//! This crate carries the pieces every other remat crate builds on: the
//! structured error type, the deterministic RNG policy, the dense two-phase
//! [`PhaseGrid`] and the [`Tracker`] contract through which the annealing
//! engine talks to correlation trackers.

pub mod errors;
pub mod grid;
pub mod rng;
pub mod tracker;

pub use errors::{ErrorInfo, RematError};
pub use grid::{opposite, Phase, PhaseGrid, Site, MAX_NDIM};
pub use rng::{derive_substream_seed, RngHandle};
pub use tracker::{CorrelationData, Descriptor, Direction, FunctionKind, Tracker};

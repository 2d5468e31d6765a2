#![deny(missing_docs)]

//! Reference correlation tracker for the remat engine.
//!
//! [`TrackedGrid`] owns a [`remat_core::PhaseGrid`] together with exact
//! integer counts backing two-point (S2) and lineal-path (L2) statistics.
//! Single-site writes update every tracked count incrementally in
//! O(length x directions) and return a token whose rollback restores the
//! grid and all counts bitwise, which is the contract the annealing engine
//! leans on when it rejects proposals.

mod hash;
mod lineal;
mod support;
mod tracker;
mod two_point;

pub use hash::state_hash;
pub use tracker::{SiteToken, TrackedGrid};

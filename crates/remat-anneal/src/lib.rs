#![deny(missing_docs)]

//! Simulated-annealing reconstruction engine for two-phase random media.
//!
//! The engine evolves a binary lattice until its spatial correlation
//! functions match a target's, one undoable Metropolis step at a time. It
//! talks to correlation trackers exclusively through the
//! [`remat_core::Tracker`] contract, and every strategy seam (site
//! sampling, grid mutation, distance, temperature policy) is a closed enum
//! dispatched at the driver boundary.

pub mod config;
pub mod cooldown;
pub mod cost;
pub mod furnace;
pub mod init;
pub mod kernel;
pub mod metrics;
pub mod modifier;
pub mod ray;
pub mod sampler;

pub use config::{AnnealConfig, ControlSpec, CooldownSpec, CostSpec, ModifierSpec, SamplerSpec};
pub use cooldown::{Cooldown, DEFAULT_LAMBDA};
pub use cost::CostFunction;
pub use furnace::Furnace;
pub use init::{fit_boolean_model, initialize_random, initialize_spheres};
pub use kernel::{run, run_config, step, ROLLBACK_COST_TOLERANCE};
pub use metrics::{MetricSample, MetricsRecorder, RunSummary};
pub use modifier::{Modifier, Proposal, SWAP_MAX_RETRIES};
pub use ray::LineRay;
pub use sampler::{dpn_histogram, Sampler, INTERFACE_MAX_RETRIES};

//! Annealing-state container.

use remat_core::errors::{ErrorInfo, RematError};
use remat_core::{RngHandle, Tracker};

use crate::cost::ensure_compatible;
use crate::init::{initialize_random, initialize_spheres};

/// State of one annealing chain: the evolving system, the fixed target,
/// the temperature and the uphill counters.
///
/// Every [`step`](crate::kernel::step) consumes a furnace and returns a
/// fresh one, so counters can be observed without aliasing the chain.
/// `accepted` and `rejected` count uphill proposals only; downhill moves
/// advance `steps` without touching either.
#[derive(Debug)]
pub struct Furnace<T: Tracker> {
    pub(crate) system: T,
    pub(crate) target: T,
    pub(crate) temperature: f64,
    pub(crate) steps: u64,
    pub(crate) accepted: u64,
    pub(crate) rejected: u64,
}

impl<T: Tracker> Furnace<T> {
    /// Pairs a system with its target at the starting temperature. The two
    /// trackers must carry identical descriptor and direction sets.
    pub fn new(system: T, target: T, temperature: f64) -> Result<Self, RematError> {
        if !(temperature > 0.0 && temperature.is_finite()) {
            return Err(RematError::Config(
                ErrorInfo::new("bad-temperature", "starting temperature must be positive")
                    .with_context("temperature", temperature.to_string()),
            ));
        }
        ensure_compatible(&system, &target)?;
        Ok(Self {
            system,
            target,
            temperature,
            steps: 0,
            accepted: 0,
            rejected: 0,
        })
    }

    /// Builds the system with [`initialize_random`] and pairs it with the
    /// target.
    pub fn with_random_system(
        target: T,
        shape: Option<&[usize]>,
        temperature: f64,
        rng: &mut RngHandle,
    ) -> Result<Self, RematError> {
        let system = initialize_random(&target, shape, rng)?;
        Self::new(system, target, temperature)
    }

    /// Builds the system with [`initialize_spheres`] and pairs it with the
    /// target.
    pub fn with_sphere_system(
        target: T,
        shape: Option<&[usize]>,
        radius0: f64,
        intensity0: f64,
        temperature: f64,
        rng: &mut RngHandle,
    ) -> Result<Self, RematError> {
        let system = initialize_spheres(&target, shape, radius0, intensity0, rng)?;
        Self::new(system, target, temperature)
    }

    /// The evolving system tracker.
    pub fn system(&self) -> &T {
        &self.system
    }

    /// The fixed target tracker.
    pub fn target(&self) -> &T {
        &self.target
    }

    /// Current temperature.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Number of steps taken so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Number of uphill proposals that were accepted.
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Number of uphill proposals that were rejected and rolled back.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Releases the system and target trackers.
    pub fn into_parts(self) -> (T, T) {
        (self.system, self.target)
    }
}

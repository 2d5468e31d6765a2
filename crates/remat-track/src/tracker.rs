//! Reference implementation of the correlation-tracker contract.

use remat_core::errors::{ErrorInfo, RematError};
use remat_core::tracker::{CorrelationData, Descriptor, Direction, FunctionKind, Tracker};
use remat_core::{Phase, PhaseGrid};

use crate::lineal::LinealCounts;
use crate::two_point::TwoPointCounts;

/// Token reversing one [`TrackedGrid::update`]: the written index plus the
/// phase it held before the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteToken {
    index: usize,
    prior: Phase,
}

/// Per-descriptor count state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FunctionState {
    TwoPoint(TwoPointCounts),
    Lineal(LinealCounts),
}

impl FunctionState {
    fn build(
        grid: &PhaseGrid,
        descriptor: Descriptor,
        directions: &[Direction],
        length: usize,
    ) -> Self {
        let steps = directions.iter().map(Direction::step).collect();
        match descriptor.kind {
            FunctionKind::TwoPoint => {
                FunctionState::TwoPoint(TwoPointCounts::build(grid, descriptor.phase, steps, length))
            }
            FunctionKind::LinealPath => {
                FunctionState::Lineal(LinealCounts::build(grid, descriptor.phase, steps, length))
            }
        }
    }

    fn remove_site(&mut self, grid: &PhaseGrid, index: usize) {
        match self {
            FunctionState::TwoPoint(counts) => counts.remove_site(grid, index),
            FunctionState::Lineal(counts) => counts.remove_site(grid, index),
        }
    }

    fn add_site(&mut self, grid: &PhaseGrid, index: usize) {
        match self {
            FunctionState::TwoPoint(counts) => counts.add_site(grid, index),
            FunctionState::Lineal(counts) => counts.add_site(grid, index),
        }
    }

    fn probabilities(&self) -> Vec<Vec<f64>> {
        match self {
            FunctionState::TwoPoint(counts) => counts.probabilities(),
            FunctionState::Lineal(counts) => counts.probabilities(),
        }
    }

    pub(crate) fn raw_counts(&self) -> &[Vec<u64>] {
        match self {
            FunctionState::TwoPoint(counts) => counts.raw_counts(),
            FunctionState::Lineal(counts) => counts.raw_counts(),
        }
    }
}

/// Grid plus exact correlation counts, updated incrementally per write.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedGrid {
    grid: PhaseGrid,
    descriptors: Vec<Descriptor>,
    directions: Vec<Direction>,
    length: usize,
    states: Vec<FunctionState>,
}

impl TrackedGrid {
    /// Wraps a grid and builds counts for every descriptor.
    pub fn new(
        grid: PhaseGrid,
        descriptors: Vec<Descriptor>,
        directions: Vec<Direction>,
        length: usize,
    ) -> Result<Self, RematError> {
        if descriptors.is_empty() {
            return Err(RematError::Tracker(ErrorInfo::new(
                "no-descriptors",
                "a tracker needs at least one descriptor",
            )));
        }
        if directions.is_empty() {
            return Err(RematError::Tracker(ErrorInfo::new(
                "no-directions",
                "a tracker needs at least one direction",
            )));
        }
        if length == 0 {
            return Err(RematError::Tracker(ErrorInfo::new(
                "zero-length",
                "correlation length must be at least one lag",
            )));
        }
        for (slot, descriptor) in descriptors.iter().enumerate() {
            if descriptor.phase > 1 {
                return Err(RematError::Tracker(
                    ErrorInfo::new("invalid-phase", "descriptors must name phase 0 or 1")
                        .with_context("descriptor", descriptor.label()),
                ));
            }
            if descriptors[..slot].contains(descriptor) {
                return Err(RematError::Tracker(
                    ErrorInfo::new("duplicate-descriptor", "descriptors must be unique")
                        .with_context("descriptor", descriptor.label()),
                ));
            }
        }
        for (slot, direction) in directions.iter().enumerate() {
            if !direction.valid_for(grid.ndim()) {
                return Err(RematError::Tracker(
                    ErrorInfo::new("invalid-direction", "direction leaves the lattice rank")
                        .with_context("rank", grid.ndim().to_string()),
                ));
            }
            if directions[..slot].contains(direction) {
                return Err(RematError::Tracker(ErrorInfo::new(
                    "duplicate-direction",
                    "directions must be unique",
                )));
            }
        }
        let states = descriptors
            .iter()
            .map(|&descriptor| FunctionState::build(&grid, descriptor, &directions, length))
            .collect();
        Ok(Self {
            grid,
            descriptors,
            directions,
            length,
            states,
        })
    }

    fn write(&mut self, value: Phase, index: usize) {
        if self.grid.get(index) == value {
            return;
        }
        for state in &mut self.states {
            state.remove_site(&self.grid, index);
        }
        self.grid.set(index, value);
        for state in &mut self.states {
            state.add_site(&self.grid, index);
        }
    }

    pub(crate) fn states(&self) -> &[FunctionState] {
        &self.states
    }
}

impl Tracker for TrackedGrid {
    type Token = SiteToken;

    fn shape(&self) -> &[usize] {
        self.grid.shape()
    }

    fn len(&self) -> usize {
        self.grid.len()
    }

    fn is_periodic(&self) -> bool {
        self.grid.is_periodic()
    }

    fn correlation_length(&self) -> usize {
        self.length
    }

    fn grid(&self) -> &PhaseGrid {
        &self.grid
    }

    fn read(&self, index: usize) -> Phase {
        self.grid.get(index)
    }

    fn update(&mut self, value: Phase, index: usize) -> Result<SiteToken, RematError> {
        if value > 1 {
            return Err(RematError::Tracker(
                ErrorInfo::new("invalid-phase", "phase values must be 0 or 1")
                    .with_context("value", value.to_string()),
            ));
        }
        if index >= self.grid.len() {
            return Err(RematError::Tracker(
                ErrorInfo::new("index-range", "site index outside the grid")
                    .with_context("index", index.to_string())
                    .with_context("len", self.grid.len().to_string()),
            ));
        }
        let prior = self.grid.get(index);
        self.write(value, index);
        Ok(SiteToken { index, prior })
    }

    fn rollback(&mut self, token: SiteToken) -> Result<(), RematError> {
        if token.index >= self.grid.len() {
            return Err(RematError::Tracker(
                ErrorInfo::new("index-range", "rollback token outside the grid")
                    .with_context("index", token.index.to_string()),
            ));
        }
        self.write(token.prior, token.index);
        Ok(())
    }

    fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    fn directions(&self) -> &[Direction] {
        &self.directions
    }

    fn correlation(&self, descriptor: Descriptor) -> Result<CorrelationData, RematError> {
        let slot = self
            .descriptors
            .iter()
            .position(|&candidate| candidate == descriptor)
            .ok_or_else(|| {
                RematError::Tracker(
                    ErrorInfo::new("untracked-descriptor", "descriptor is not tracked")
                        .with_context("descriptor", descriptor.label()),
                )
            })?;
        Ok(CorrelationData::new(
            self.directions.clone(),
            self.states[slot].probabilities(),
        ))
    }

    fn construct_like(&self, grid: PhaseGrid) -> Result<Self, RematError> {
        TrackedGrid::new(
            grid,
            self.descriptors.clone(),
            self.directions.clone(),
            self.length,
        )
    }
}

//! Site-sampling strategies for proposal generation.

use remat_core::errors::{ErrorInfo, RematError};
use remat_core::{PhaseGrid, RngHandle};

use crate::ray::LineRay;

/// Reseed budget for the interface walk before the grid is declared
/// homogeneous.
pub const INTERFACE_MAX_RETRIES: usize = 1024;

/// Chooses one lattice site per call according to a strategy.
///
/// Stateful variants must be notified of every grid mutation through
/// [`update_pre`]/[`update_post`], including the mutations performed while a
/// proposal is being rolled back.
///
/// [`update_pre`]: Sampler::update_pre
/// [`update_post`]: Sampler::update_post
#[derive(Debug, Clone)]
pub enum Sampler {
    /// Uniformly random site.
    Uniform,
    /// Site on a phase boundary, weighted by boundary exposure: walk a
    /// random ray from a random seed and take the first site whose phase
    /// differs from the seed's.
    Interface {
        /// Reseed budget before giving up on a homogeneous grid.
        max_retries: usize,
    },
    /// Site biased by its count of different-phase Moore neighbors: bucket
    /// n is drawn with probability proportional to `alpha^n * histogram[n]`.
    DifferentPhaseNeighbors {
        /// Biasing base applied per opposite-phase neighbor.
        alpha: f64,
        /// `histogram[n]` = number of sites with exactly n opposite-phase
        /// Moore neighbors, maintained incrementally across mutations.
        histogram: Vec<u64>,
    },
}

impl Sampler {
    /// Uniformly random sampler.
    pub fn uniform() -> Self {
        Sampler::Uniform
    }

    /// Interface sampler with the default reseed budget.
    pub fn interface() -> Self {
        Sampler::Interface {
            max_retries: INTERFACE_MAX_RETRIES,
        }
    }

    /// Different-phase-neighbors sampler seeded with a full histogram scan
    /// of `grid`.
    pub fn dpn(grid: &PhaseGrid, alpha: f64) -> Result<Self, RematError> {
        if !(alpha > 0.0 && alpha.is_finite()) {
            return Err(RematError::Sampler(
                ErrorInfo::new("invalid-alpha", "DPN bias must be a positive finite number")
                    .with_context("alpha", alpha.to_string()),
            ));
        }
        Ok(Sampler::DifferentPhaseNeighbors {
            alpha,
            histogram: dpn_histogram(grid),
        })
    }

    /// Draws one in-bounds linear index from `grid`.
    pub fn sample(&mut self, grid: &PhaseGrid, rng: &mut RngHandle) -> Result<usize, RematError> {
        match self {
            Sampler::Uniform => Ok(rng.next_index(grid.len())),
            Sampler::Interface { max_retries } => sample_interface(grid, *max_retries, rng),
            Sampler::DifferentPhaseNeighbors { alpha, histogram } => {
                sample_dpn(grid, *alpha, histogram, rng)
            }
        }
    }

    /// Notifies the sampler that the site at `index` is about to mutate.
    pub fn update_pre(&mut self, grid: &PhaseGrid, index: usize) -> Result<(), RematError> {
        if let Sampler::DifferentPhaseNeighbors { histogram, .. } = self {
            retire_counts(grid, index, histogram)?;
        }
        Ok(())
    }

    /// Notifies the sampler that the site at `index` has mutated.
    pub fn update_post(&mut self, grid: &PhaseGrid, index: usize) -> Result<(), RematError> {
        if let Sampler::DifferentPhaseNeighbors { histogram, .. } = self {
            admit_counts(grid, index, histogram);
        }
        Ok(())
    }

    /// Read access to the DPN histogram, when this sampler carries one.
    pub fn histogram(&self) -> Option<&[u64]> {
        match self {
            Sampler::DifferentPhaseNeighbors { histogram, .. } => Some(histogram),
            _ => None,
        }
    }
}

/// Counts, for every site, its different-phase Moore neighbors and returns
/// the bucket histogram `H[0..3^N - 1]`.
pub fn dpn_histogram(grid: &PhaseGrid) -> Vec<u64> {
    let mut histogram = vec![0u64; grid.dpn_buckets()];
    for index in 0..grid.len() {
        histogram[grid.dpn_count(index)] += 1;
    }
    histogram
}

fn sample_interface(
    grid: &PhaseGrid,
    max_retries: usize,
    rng: &mut RngHandle,
) -> Result<usize, RematError> {
    for _ in 0..max_retries {
        let seed = rng.next_index(grid.len());
        let seed_phase = grid.get(seed);
        for site in LineRay::cast(grid.site_of(seed), grid.ndim(), rng) {
            match grid.index_in_bounds(site) {
                Some(index) => {
                    if grid.get(index) != seed_phase {
                        return Ok(index);
                    }
                }
                None => break,
            }
        }
    }
    Err(RematError::Sampler(
        ErrorInfo::new("no-interface", "no phase boundary found within the retry budget")
            .with_context("retries", max_retries.to_string())
            .with_hint("interface sampling needs both phases present in the grid"),
    ))
}

fn sample_dpn(
    grid: &PhaseGrid,
    alpha: f64,
    histogram: &[u64],
    rng: &mut RngHandle,
) -> Result<usize, RematError> {
    let mut weights = Vec::with_capacity(histogram.len());
    let mut total = 0.0;
    for (bucket, &population) in histogram.iter().enumerate() {
        let weight = alpha.powi(bucket as i32) * population as f64;
        weights.push(weight);
        total += weight;
    }
    if !(total > 0.0) {
        return Err(RematError::Sampler(ErrorInfo::new(
            "histogram-invariant",
            "DPN histogram carries no population",
        )));
    }

    let draw = rng.next_f64() * total;
    let mut running = 0.0;
    let mut bucket = histogram.len() - 1;
    for (candidate, &weight) in weights.iter().enumerate() {
        running += weight;
        if running >= draw && weight > 0.0 {
            bucket = candidate;
            break;
        }
    }
    if histogram[bucket] == 0 {
        return Err(RematError::Sampler(
            ErrorInfo::new("histogram-invariant", "selected DPN bucket is empty")
                .with_context("bucket", bucket.to_string()),
        ));
    }

    let budget = grid.len().saturating_mul(64).max(4096);
    for _ in 0..budget {
        let index = rng.next_index(grid.len());
        if grid.dpn_count(index) == bucket {
            return Ok(index);
        }
    }
    Err(RematError::Sampler(
        ErrorInfo::new(
            "histogram-invariant",
            "no site matches the selected DPN bucket",
        )
        .with_context("bucket", bucket.to_string())
        .with_hint("the histogram has drifted from the grid; update_pre/update_post were skipped"),
    ))
}

/// Removes the histogram contributions of `index` and its Moore neighbors
/// under the current grid contents.
fn retire_counts(
    grid: &PhaseGrid,
    index: usize,
    histogram: &mut [u64],
) -> Result<(), RematError> {
    let mut drift = false;
    let mut retire = |site: usize| {
        let bucket = grid.dpn_count(site);
        match histogram[bucket].checked_sub(1) {
            Some(rest) => histogram[bucket] = rest,
            None => drift = true,
        }
    };
    retire(index);
    grid.for_each_moore_neighbor(index, &mut retire);
    if drift {
        return Err(RematError::Sampler(
            ErrorInfo::new("histogram-invariant", "DPN bucket underflow during update")
                .with_context("index", index.to_string()),
        ));
    }
    Ok(())
}

/// Re-counts `index` and its Moore neighbors under the mutated grid.
fn admit_counts(grid: &PhaseGrid, index: usize, histogram: &mut [u64]) {
    histogram[grid.dpn_count(index)] += 1;
    grid.for_each_moore_neighbor(index, |site| {
        histogram[grid.dpn_count(site)] += 1;
    });
}

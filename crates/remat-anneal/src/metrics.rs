//! In-memory run metrics.

use serde::{Deserialize, Serialize};

use remat_core::errors::{ErrorInfo, RematError};

/// Thinned per-step observation of one annealing chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Step count at which the sample was taken.
    pub step: u64,
    /// Temperature after the step.
    pub temperature: f64,
    /// Cost after the step.
    pub cost: f64,
    /// Cumulative uphill acceptances.
    pub accepted: u64,
    /// Cumulative uphill rejections.
    pub rejected: u64,
}

/// Aggregate summary returned to callers after a run completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Steps executed by the run.
    pub steps: u64,
    /// Cost before the first step.
    pub initial_cost: f64,
    /// Cost after the last step.
    pub final_cost: f64,
    /// Lowest cost observed at any sampling point.
    pub best_cost: f64,
    /// Final temperature of the chain.
    pub final_temperature: f64,
    /// Uphill proposals accepted.
    pub uphill_accepted: u64,
    /// Uphill proposals rejected.
    pub uphill_rejected: u64,
    /// Accepted fraction of uphill proposals.
    pub uphill_acceptance_rate: f64,
    /// Thinned samples collected during the run.
    pub samples: Vec<MetricSample>,
}

impl RunSummary {
    /// Serializes the summary as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, RematError> {
        serde_json::to_string_pretty(self).map_err(|err| {
            RematError::Config(ErrorInfo::new("summary-encode", err.to_string()))
        })
    }
}

/// Collects thinned samples and cost extrema over one run.
#[derive(Debug, Clone, Default)]
pub struct MetricsRecorder {
    thinning: u64,
    initial_cost: Option<f64>,
    best_cost: Option<f64>,
    samples: Vec<MetricSample>,
}

impl MetricsRecorder {
    /// Creates a recorder sampling every `thinning`-th step (0 is treated
    /// as 1).
    pub fn new(thinning: u64) -> Self {
        Self {
            thinning: thinning.max(1),
            initial_cost: None,
            best_cost: None,
            samples: Vec::new(),
        }
    }

    /// Records the pre-run cost.
    pub fn note_initial(&mut self, cost: f64) {
        self.initial_cost = Some(cost);
        self.track_best(cost);
    }

    /// True when `step` falls on the sampling grid.
    pub fn due(&self, step: u64) -> bool {
        step % self.thinning.max(1) == 0
    }

    /// Appends a sample and tracks the best cost seen.
    pub fn record(&mut self, sample: MetricSample) {
        self.track_best(sample.cost);
        self.samples.push(sample);
    }

    /// Immutable view over the recorded samples.
    pub fn samples(&self) -> &[MetricSample] {
        &self.samples
    }

    /// Consumes the recorder into a [`RunSummary`].
    pub fn finish(
        self,
        steps: u64,
        final_cost: f64,
        final_temperature: f64,
        uphill_accepted: u64,
        uphill_rejected: u64,
    ) -> RunSummary {
        let uphill_total = uphill_accepted + uphill_rejected;
        let rate = if uphill_total == 0 {
            0.0
        } else {
            uphill_accepted as f64 / uphill_total as f64
        };
        let best = self
            .best_cost
            .map_or(final_cost, |best| best.min(final_cost));
        RunSummary {
            steps,
            initial_cost: self.initial_cost.unwrap_or(final_cost),
            final_cost,
            best_cost: best,
            final_temperature,
            uphill_accepted,
            uphill_rejected,
            uphill_acceptance_rate: rate,
            samples: self.samples,
        }
    }

    fn track_best(&mut self, cost: f64) {
        self.best_cost = Some(self.best_cost.map_or(cost, |best| best.min(cost)));
    }
}

//! Temperature update policies for the annealing loop.

use remat_core::errors::{ErrorInfo, RematError};

/// Default decay of the exponential schedule.
pub const DEFAULT_LAMBDA: f64 = 0.999999;

/// Stateful temperature schedule: a function of the current temperature and
/// the cost of the step that was just accepted.
///
/// The driver consults a schedule only on non-rejected steps, so the cost
/// buffers below only ever see costs the chain actually moved to.
#[derive(Debug, Clone, PartialEq)]
pub enum Cooldown {
    /// Geometric decay `T' = lambda * T`.
    Exponential {
        /// Decay factor per accepted step.
        lambda: f64,
    },
    /// Aarts-Korst adaptive schedule: every time the cost buffer fills,
    /// rescale by the spread of the recent costs.
    AartsKorst {
        /// Distance parameter weighting the current temperature.
        lambda: f64,
        /// Buffer capacity.
        window: usize,
        /// Recent accepted costs, cleared whenever the window fills.
        buffer: Vec<f64>,
    },
    /// Frost-Heineman adaptive schedule: drive the temperature toward a
    /// moving target mean cost.
    FrostHeineman {
        /// Target decrement in units of the cost spread.
        lambda: f64,
        /// Minimum number of costs before the target may move.
        window: usize,
        /// Accepted costs since the last target move.
        buffer: Vec<f64>,
        /// Mean cost the schedule is steering toward.
        target: f64,
    },
}

impl Cooldown {
    /// Exponential schedule with decay `lambda`.
    pub fn exponential(lambda: f64) -> Result<Self, RematError> {
        if !(lambda > 0.0 && lambda.is_finite()) {
            return Err(bad_parameter("lambda", lambda));
        }
        Ok(Cooldown::Exponential { lambda })
    }

    /// Aarts-Korst schedule over a window of `window` recent costs.
    pub fn aarts_korst(window: usize, lambda: f64) -> Result<Self, RematError> {
        if window < 2 {
            return Err(bad_window(window));
        }
        if !(lambda > 0.0 && lambda.is_finite()) {
            return Err(bad_parameter("lambda", lambda));
        }
        Ok(Cooldown::AartsKorst {
            lambda,
            window,
            buffer: Vec::with_capacity(window),
        })
    }

    /// Frost-Heineman schedule with a minimum window of `window` costs.
    pub fn frost_heineman(window: usize, lambda: f64) -> Result<Self, RematError> {
        if window < 2 {
            return Err(bad_window(window));
        }
        if !(lambda > 0.0 && lambda.is_finite()) {
            return Err(bad_parameter("lambda", lambda));
        }
        Ok(Cooldown::FrostHeineman {
            lambda,
            window,
            buffer: Vec::with_capacity(window),
            target: f64::INFINITY,
        })
    }

    /// Next temperature after a non-rejected step of cost `cost`.
    pub fn next_temperature(&mut self, temperature: f64, cost: f64) -> f64 {
        match self {
            Cooldown::Exponential { lambda } => *lambda * temperature,
            Cooldown::AartsKorst {
                lambda,
                window,
                buffer,
            } => {
                buffer.push(cost);
                if buffer.len() < *window {
                    return temperature;
                }
                let sigma = spread(buffer);
                buffer.clear();
                temperature * sigma / (sigma + *lambda * temperature)
            }
            Cooldown::FrostHeineman {
                lambda,
                window,
                buffer,
                target,
            } => {
                buffer.push(cost);
                if buffer.len() < *window {
                    return temperature;
                }
                let mean = buffer.iter().sum::<f64>() / buffer.len() as f64;
                if mean >= *target {
                    return temperature;
                }
                let sigma = spread(buffer);
                if sigma == 0.0 {
                    return temperature;
                }
                // The very first target move measures its decrement from the
                // current mean; later moves measure from the previous target.
                let previous = if target.is_finite() { *target } else { mean };
                *target = mean - *lambda * sigma;
                buffer.clear();
                let scale = temperature / sigma;
                temperature + (*target - previous) * scale * scale
            }
        }
    }
}

impl Default for Cooldown {
    fn default() -> Self {
        Cooldown::Exponential {
            lambda: DEFAULT_LAMBDA,
        }
    }
}

fn spread(values: &[f64]) -> f64 {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let mean_sq = values.iter().map(|&value| value * value).sum::<f64>() / values.len() as f64;
    (mean_sq - mean * mean).max(0.0).sqrt()
}

fn bad_parameter(name: &str, value: f64) -> RematError {
    RematError::Config(
        ErrorInfo::new("bad-parameter", "schedule parameter must be positive and finite")
            .with_context(name, value.to_string()),
    )
}

fn bad_window(window: usize) -> RematError {
    RematError::Config(
        ErrorInfo::new("bad-window", "schedule windows need at least two samples")
            .with_context("window", window.to_string()),
    )
}

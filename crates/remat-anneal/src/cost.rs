//! Scalar distances between the correlation statistics of two trackers.

use remat_core::errors::{ErrorInfo, RematError};
use remat_core::tracker::Descriptor;
use remat_core::Tracker;

/// Cost function dispatched at the driver boundary.
///
/// The weighted and Čapek variants are factories: their constructors capture
/// baseline distances from the trackers they are built against, and
/// [`evaluate`] reuses that state on every call.
///
/// [`evaluate`]: CostFunction::evaluate
#[derive(Debug, Clone, PartialEq)]
pub enum CostFunction {
    /// Squared distance between direction-averaged vectors, summed over
    /// descriptors.
    EuclidMean,
    /// Squared distances per direction, summed over descriptors.
    EuclidDirectional,
    /// [`EuclidMean`](Self::EuclidMean) with every descriptor normalized to
    /// its construction-time distance.
    EuclidMeanWeighted {
        /// Per-descriptor baseline distances captured at construction.
        baselines: Vec<(Descriptor, f64)>,
    },
    /// [`EuclidDirectional`](Self::EuclidDirectional) with every descriptor
    /// normalized to its construction-time distance.
    EuclidDirectionalWeighted {
        /// Per-descriptor baseline distances captured at construction.
        baselines: Vec<(Descriptor, f64)>,
    },
    /// Čapek's time-dependent cost: solid two-point and lineal-path terms
    /// plus a void lineal-path term that only gains weight as the primary
    /// terms converge.
    Capek {
        /// Control parameter scaled by the construction-time baseline sum.
        eta_scaled: f64,
    },
    /// Čapek's scheme generalized to arbitrary extra descriptors, one
    /// scaled control per descriptor.
    GeneralizedCapek {
        /// Extra descriptors with their scaled controls.
        controls: Vec<(Descriptor, f64)>,
    },
}

impl CostFunction {
    /// Unweighted direction-averaged cost.
    pub fn euclid_mean() -> Self {
        CostFunction::EuclidMean
    }

    /// Unweighted per-direction cost.
    pub fn euclid_directional() -> Self {
        CostFunction::EuclidDirectional
    }

    /// Direction-averaged cost normalizing every descriptor to parity at
    /// construction time. Fails if any baseline distance is zero.
    pub fn euclid_mean_weighted<T: Tracker>(a: &T, b: &T) -> Result<Self, RematError> {
        Ok(CostFunction::EuclidMeanWeighted {
            baselines: capture_baselines(a, b, mean_distance)?,
        })
    }

    /// Per-direction cost normalizing every descriptor to parity at
    /// construction time. Fails if any baseline distance is zero.
    pub fn euclid_directional_weighted<T: Tracker>(a: &T, b: &T) -> Result<Self, RematError> {
        Ok(CostFunction::EuclidDirectionalWeighted {
            baselines: capture_baselines(a, b, directional_distance)?,
        })
    }

    /// Čapek cost with control `eta`. The trackers must carry the solid
    /// two-point, solid lineal-path and void lineal-path descriptors.
    pub fn capek<T: Tracker>(a: &T, b: &T, eta: f64) -> Result<Self, RematError> {
        validate_eta(eta, 0.0..=f64::INFINITY)?;
        ensure_compatible(a, b)?;
        require_descriptor(a, Descriptor::lineal_path(0))?;
        let base = capek_baseline(a, b)?;
        Ok(CostFunction::Capek {
            eta_scaled: eta * base,
        })
    }

    /// Generalized Čapek cost: each `(descriptor, eta)` pair contributes a
    /// converging-weight term, with every `eta` in `[0, 1]`.
    pub fn generalized_capek<T: Tracker>(
        a: &T,
        b: &T,
        controls: &[(Descriptor, f64)],
    ) -> Result<Self, RematError> {
        ensure_compatible(a, b)?;
        let base = capek_baseline(a, b)?;
        let mut scaled = Vec::with_capacity(controls.len());
        for (slot, &(descriptor, eta)) in controls.iter().enumerate() {
            validate_eta(eta, 0.0..=1.0)?;
            require_descriptor(a, descriptor)?;
            if controls[..slot].iter().any(|&(seen, _)| seen == descriptor) {
                return Err(RematError::Cost(
                    ErrorInfo::new("duplicate-descriptor", "control descriptors must be unique")
                        .with_context("descriptor", descriptor.label()),
                ));
            }
            scaled.push((descriptor, eta * base));
        }
        Ok(CostFunction::GeneralizedCapek { controls: scaled })
    }

    /// Scalar distance between the correlation statistics of two trackers.
    pub fn evaluate<T: Tracker>(&self, a: &T, b: &T) -> Result<f64, RematError> {
        ensure_compatible(a, b)?;
        match self {
            CostFunction::EuclidMean => sum_over_descriptors(a, b, mean_distance),
            CostFunction::EuclidDirectional => sum_over_descriptors(a, b, directional_distance),
            CostFunction::EuclidMeanWeighted { baselines } => {
                weighted_sum(a, b, baselines, mean_distance)
            }
            CostFunction::EuclidDirectionalWeighted { baselines } => {
                weighted_sum(a, b, baselines, directional_distance)
            }
            CostFunction::Capek { eta_scaled } => {
                let primary = capek_primary(a, b)?;
                let void_path = directional_distance(a, b, Descriptor::lineal_path(0))?;
                Ok(primary + converging_term(*eta_scaled, primary, void_path))
            }
            CostFunction::GeneralizedCapek { controls } => {
                let primary = capek_primary(a, b)?;
                let mut total = primary;
                for &(descriptor, eta_scaled) in controls {
                    let distance = directional_distance(a, b, descriptor)?;
                    total += converging_term(eta_scaled, primary, distance);
                }
                Ok(total)
            }
        }
    }
}

/// Squared Euclidean distance between two equally long vectors.
fn squared_distance(x: &[f64], y: &[f64]) -> f64 {
    x.iter()
        .zip(y.iter())
        .map(|(&xi, &yi)| (xi - yi) * (xi - yi))
        .sum()
}

fn mean_distance<T: Tracker>(a: &T, b: &T, descriptor: Descriptor) -> Result<f64, RematError> {
    let data_a = a.correlation(descriptor)?;
    let data_b = b.correlation(descriptor)?;
    Ok(squared_distance(&data_a.mean(), &data_b.mean()))
}

fn directional_distance<T: Tracker>(
    a: &T,
    b: &T,
    descriptor: Descriptor,
) -> Result<f64, RematError> {
    let data_a = a.correlation(descriptor)?;
    let data_b = b.correlation(descriptor)?;
    let mut total = 0.0;
    for (direction, vector_a) in data_a.iter() {
        let vector_b = data_b.for_direction(direction).ok_or_else(|| {
            RematError::Cost(
                ErrorInfo::new("direction-mismatch", "trackers report different directions")
                    .with_context("descriptor", descriptor.label()),
            )
        })?;
        total += squared_distance(vector_a, vector_b);
    }
    Ok(total)
}

fn sum_over_descriptors<T: Tracker>(
    a: &T,
    b: &T,
    distance: impl Fn(&T, &T, Descriptor) -> Result<f64, RematError>,
) -> Result<f64, RematError> {
    let mut total = 0.0;
    for &descriptor in a.descriptors() {
        total += distance(a, b, descriptor)?;
    }
    Ok(total)
}

fn capture_baselines<T: Tracker>(
    a: &T,
    b: &T,
    distance: impl Fn(&T, &T, Descriptor) -> Result<f64, RematError>,
) -> Result<Vec<(Descriptor, f64)>, RematError> {
    ensure_compatible(a, b)?;
    let mut baselines = Vec::with_capacity(a.descriptors().len());
    for &descriptor in a.descriptors() {
        let baseline = distance(a, b, descriptor)?;
        if baseline == 0.0 {
            return Err(RematError::Cost(
                ErrorInfo::new("zero-baseline", "descriptor baseline distance is zero")
                    .with_context("descriptor", descriptor.label())
                    .with_hint("weighted costs need the trackers to differ on every descriptor"),
            ));
        }
        baselines.push((descriptor, baseline));
    }
    Ok(baselines)
}

fn weighted_sum<T: Tracker>(
    a: &T,
    b: &T,
    baselines: &[(Descriptor, f64)],
    distance: impl Fn(&T, &T, Descriptor) -> Result<f64, RematError>,
) -> Result<f64, RematError> {
    let mut total = 0.0;
    for &(descriptor, baseline) in baselines {
        total += distance(a, b, descriptor)? / baseline;
    }
    Ok(total)
}

/// Solid two-point plus solid lineal-path distance, the primary Čapek
/// objective.
fn capek_primary<T: Tracker>(a: &T, b: &T) -> Result<f64, RematError> {
    Ok(directional_distance(a, b, Descriptor::two_point(0))?
        + directional_distance(a, b, Descriptor::lineal_path(1))?)
}

fn capek_baseline<T: Tracker>(a: &T, b: &T) -> Result<f64, RematError> {
    require_descriptor(a, Descriptor::two_point(0))?;
    require_descriptor(a, Descriptor::lineal_path(1))?;
    capek_primary(a, b)
}

/// Extra-descriptor contribution `eta' / (eta' + primary) * distance`: near
/// zero while the primary objective is large, approaching `distance` as it
/// converges.
fn converging_term(eta_scaled: f64, primary: f64, distance: f64) -> f64 {
    if eta_scaled > 0.0 {
        distance * eta_scaled / (eta_scaled + primary)
    } else {
        0.0
    }
}

fn validate_eta(eta: f64, range: std::ops::RangeInclusive<f64>) -> Result<(), RematError> {
    if !eta.is_finite() || !range.contains(&eta) {
        return Err(RematError::Cost(
            ErrorInfo::new("invalid-eta", "control parameter outside its valid range")
                .with_context("eta", eta.to_string()),
        ));
    }
    Ok(())
}

fn require_descriptor<T: Tracker>(tracker: &T, descriptor: Descriptor) -> Result<(), RematError> {
    if tracker.descriptors().contains(&descriptor) {
        Ok(())
    } else {
        Err(RematError::Cost(
            ErrorInfo::new("missing-descriptor", "cost needs a descriptor the tracker lacks")
                .with_context("descriptor", descriptor.label()),
        ))
    }
}

pub(crate) fn ensure_compatible<T: Tracker>(a: &T, b: &T) -> Result<(), RematError> {
    let mut descriptors_a = a.descriptors().to_vec();
    let mut descriptors_b = b.descriptors().to_vec();
    descriptors_a.sort_unstable();
    descriptors_b.sort_unstable();
    if descriptors_a != descriptors_b {
        return Err(RematError::Cost(ErrorInfo::new(
            "descriptor-mismatch",
            "trackers carry different descriptor sets",
        )));
    }
    let mut directions_a = a.directions().to_vec();
    let mut directions_b = b.directions().to_vec();
    directions_a.sort_unstable();
    directions_b.sort_unstable();
    if directions_a != directions_b {
        return Err(RematError::Cost(ErrorInfo::new(
            "direction-mismatch",
            "trackers carry different direction sets",
        )));
    }
    Ok(())
}

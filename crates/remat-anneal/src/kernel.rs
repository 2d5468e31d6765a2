//! The Metropolis step and the run loop built on it.

use remat_core::errors::{ErrorInfo, RematError};
use remat_core::{derive_substream_seed, RngHandle, Tracker};

use crate::config::AnnealConfig;
use crate::cooldown::Cooldown;
use crate::cost::CostFunction;
use crate::furnace::Furnace;
use crate::metrics::{MetricSample, MetricsRecorder, RunSummary};
use crate::modifier::Modifier;

/// Relative tolerance for the post-rollback cost check.
pub const ROLLBACK_COST_TOLERANCE: f64 = 1.0e-8;

/// Performs one Metropolis step and returns the successor furnace.
///
/// Downhill and flat moves are kept without touching the uphill counters.
/// Uphill moves are kept with probability `exp(-(c2 - c1) / T)`; otherwise
/// the proposal is rolled back and the restored cost is checked against the
/// pre-proposal cost. The schedule is consulted only when the step was not
/// rejected; rejected steps preserve the temperature exactly.
pub fn step<T: Tracker>(
    furnace: Furnace<T>,
    cost: &CostFunction,
    modifier: &mut Modifier,
    cooldown: &mut Cooldown,
    rng: &mut RngHandle,
) -> Result<Furnace<T>, RematError> {
    let Furnace {
        mut system,
        target,
        temperature,
        steps,
        mut accepted,
        mut rejected,
    } = furnace;

    let before = cost.evaluate(&system, &target)?;
    let proposal = modifier.modify(&mut system, rng)?;
    let after = cost.evaluate(&system, &target)?;

    let mut was_rejected = false;
    if after > before {
        let acceptance = (-(after - before) / temperature).exp();
        if rng.next_f64() <= acceptance {
            accepted += 1;
        } else {
            modifier.reject(&mut system, proposal)?;
            let restored = cost.evaluate(&system, &target)?;
            let tolerance = ROLLBACK_COST_TOLERANCE * before.abs().max(1.0);
            if (restored - before).abs() > tolerance {
                return Err(RematError::Kernel(
                    ErrorInfo::new("cost-regression", "rollback did not restore the cost")
                        .with_context("before", before.to_string())
                        .with_context("restored", restored.to_string())
                        .with_hint("a tracker, modifier or sampler failed to rewind exactly"),
                ));
            }
            rejected += 1;
            was_rejected = true;
        }
    }

    let temperature = if was_rejected {
        temperature
    } else {
        cooldown.next_temperature(temperature, after)
    };

    Ok(Furnace {
        system,
        target,
        temperature,
        steps: steps + 1,
        accepted,
        rejected,
    })
}

/// Runs `steps` Metropolis steps, sampling metrics every `thinning`-th
/// step, and returns the final furnace with the run summary.
pub fn run<T: Tracker>(
    mut furnace: Furnace<T>,
    cost: &CostFunction,
    modifier: &mut Modifier,
    cooldown: &mut Cooldown,
    rng: &mut RngHandle,
    steps: u64,
    thinning: u64,
) -> Result<(Furnace<T>, RunSummary), RematError> {
    let mut recorder = MetricsRecorder::new(thinning);
    let initial = cost.evaluate(&furnace.system, &furnace.target)?;
    recorder.note_initial(initial);
    recorder.record(MetricSample {
        step: furnace.steps,
        temperature: furnace.temperature,
        cost: initial,
        accepted: furnace.accepted,
        rejected: furnace.rejected,
    });

    for _ in 0..steps {
        furnace = step(furnace, cost, modifier, cooldown, rng)?;
        if recorder.due(furnace.steps) {
            let current = cost.evaluate(&furnace.system, &furnace.target)?;
            recorder.record(MetricSample {
                step: furnace.steps,
                temperature: furnace.temperature,
                cost: current,
                accepted: furnace.accepted,
                rejected: furnace.rejected,
            });
        }
    }

    let final_cost = cost.evaluate(&furnace.system, &furnace.target)?;
    let summary = recorder.finish(
        furnace.steps,
        final_cost,
        furnace.temperature,
        furnace.accepted,
        furnace.rejected,
    );
    Ok((furnace, summary))
}

/// Builds the strategy objects described by `config` and runs the furnace
/// under them, seeding the chain RNG from the config's master seed.
pub fn run_config<T: Tracker>(
    config: &AnnealConfig,
    furnace: Furnace<T>,
) -> Result<(Furnace<T>, RunSummary), RematError> {
    let cost = config.cost.build(&furnace.system, &furnace.target)?;
    let mut modifier = config.modifier.build(furnace.system.grid())?;
    let mut cooldown = config.cooldown.build()?;
    let mut rng = RngHandle::from_seed(derive_substream_seed(config.master_seed, 0));
    run(
        furnace,
        &cost,
        &mut modifier,
        &mut cooldown,
        &mut rng,
        config.steps,
        config.thinning,
    )
}

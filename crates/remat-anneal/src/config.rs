//! Serde-configurable run parameters and strategy specs.

use serde::{Deserialize, Serialize};

use remat_core::errors::{ErrorInfo, RematError};
use remat_core::tracker::Descriptor;
use remat_core::{FunctionKind, Phase, PhaseGrid, Tracker};

use crate::cooldown::{Cooldown, DEFAULT_LAMBDA};
use crate::cost::CostFunction;
use crate::modifier::Modifier;
use crate::sampler::Sampler;

/// YAML-configurable parameters governing one annealing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnealConfig {
    /// Number of Metropolis steps to execute.
    #[serde(default = "default_steps")]
    pub steps: u64,
    /// Starting temperature handed to the furnace constructor.
    #[serde(default = "default_temperature")]
    pub initial_temperature: f64,
    /// Interval at which metric samples are recorded.
    #[serde(default = "default_thinning")]
    pub thinning: u64,
    /// Master seed; the chain RNG uses substream 0.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
    /// Mutation strategy.
    #[serde(default)]
    pub modifier: ModifierSpec,
    /// Cost function.
    #[serde(default)]
    pub cost: CostSpec,
    /// Temperature schedule.
    #[serde(default)]
    pub cooldown: CooldownSpec,
}

fn default_steps() -> u64 {
    10_000
}

fn default_temperature() -> f64 {
    1.0
}

fn default_thinning() -> u64 {
    100
}

fn default_master_seed() -> u64 {
    0x52E3_A7ED_C0A1_5EED_u64
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            initial_temperature: default_temperature(),
            thinning: default_thinning(),
            master_seed: default_master_seed(),
            modifier: ModifierSpec::default(),
            cost: CostSpec::default(),
            cooldown: CooldownSpec::default(),
        }
    }
}

impl AnnealConfig {
    /// Parses a config from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, RematError> {
        serde_yaml::from_str(text).map_err(|err| {
            RematError::Config(ErrorInfo::new("yaml-parse", err.to_string()))
        })
    }

    /// Serializes the config as YAML text.
    pub fn to_yaml(&self) -> Result<String, RematError> {
        serde_yaml::to_string(self).map_err(|err| {
            RematError::Config(ErrorInfo::new("yaml-encode", err.to_string()))
        })
    }
}

/// Site-sampling strategy selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SamplerSpec {
    /// Uniformly random sites.
    Uniform,
    /// Phase-boundary sites via ray walks.
    #[default]
    Interface,
    /// Sites biased by their count of different-phase neighbors.
    DifferentPhaseNeighbors {
        /// Biasing base applied per opposite-phase neighbor.
        #[serde(default = "default_alpha")]
        alpha: f64,
    },
}

fn default_alpha() -> f64 {
    1.0
}

impl SamplerSpec {
    /// Builds the sampler, scanning `grid` when the strategy carries state.
    pub fn build(&self, grid: &PhaseGrid) -> Result<Sampler, RematError> {
        match self {
            SamplerSpec::Uniform => Ok(Sampler::uniform()),
            SamplerSpec::Interface => Ok(Sampler::interface()),
            SamplerSpec::DifferentPhaseNeighbors { alpha } => Sampler::dpn(grid, *alpha),
        }
    }
}

/// Mutation strategy selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ModifierSpec {
    /// Flip one sampled site.
    Flip {
        /// Sampler the modifier draws sites from.
        #[serde(default)]
        sampler: SamplerSpec,
    },
    /// Swap two sampled sites of opposing phase.
    Swap {
        /// Sampler the modifier draws sites from.
        #[serde(default)]
        sampler: SamplerSpec,
    },
}

impl Default for ModifierSpec {
    fn default() -> Self {
        ModifierSpec::Flip {
            sampler: SamplerSpec::default(),
        }
    }
}

impl ModifierSpec {
    /// Builds the modifier, scanning `grid` for stateful samplers.
    pub fn build(&self, grid: &PhaseGrid) -> Result<Modifier, RematError> {
        match self {
            ModifierSpec::Flip { sampler } => Ok(Modifier::flipper(sampler.build(grid)?)),
            ModifierSpec::Swap { sampler } => Ok(Modifier::swapper(sampler.build(grid)?)),
        }
    }
}

/// One extra-descriptor control for the generalized Čapek cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSpec {
    /// Correlation function family of the controlled descriptor.
    pub kind: FunctionKind,
    /// Phase of the controlled descriptor.
    pub phase: Phase,
    /// Control strength in `[0, 1]`.
    pub eta: f64,
}

/// Cost function selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CostSpec {
    /// Direction-averaged squared distances.
    EuclidMean,
    /// Per-direction squared distances.
    #[default]
    EuclidDirectional,
    /// Direction-averaged distances normalized per descriptor.
    EuclidMeanWeighted,
    /// Per-direction distances normalized per descriptor.
    EuclidDirectionalWeighted,
    /// Čapek's time-dependent cost.
    Capek {
        /// Control parameter for the void lineal-path term.
        #[serde(default = "default_eta")]
        eta: f64,
    },
    /// Generalized Čapek cost over arbitrary extra descriptors.
    GeneralizedCapek {
        /// Extra descriptors with their control strengths.
        controls: Vec<ControlSpec>,
    },
}

fn default_eta() -> f64 {
    0.6
}

impl CostSpec {
    /// Builds the cost function, capturing baselines from the tracker pair
    /// where the variant needs them.
    pub fn build<T: Tracker>(&self, a: &T, b: &T) -> Result<CostFunction, RematError> {
        match self {
            CostSpec::EuclidMean => Ok(CostFunction::euclid_mean()),
            CostSpec::EuclidDirectional => Ok(CostFunction::euclid_directional()),
            CostSpec::EuclidMeanWeighted => CostFunction::euclid_mean_weighted(a, b),
            CostSpec::EuclidDirectionalWeighted => CostFunction::euclid_directional_weighted(a, b),
            CostSpec::Capek { eta } => CostFunction::capek(a, b, *eta),
            CostSpec::GeneralizedCapek { controls } => {
                let pairs: Vec<(Descriptor, f64)> = controls
                    .iter()
                    .map(|control| {
                        (
                            Descriptor {
                                kind: control.kind,
                                phase: control.phase,
                            },
                            control.eta,
                        )
                    })
                    .collect();
                CostFunction::generalized_capek(a, b, &pairs)
            }
        }
    }
}

/// Temperature schedule selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CooldownSpec {
    /// Geometric decay.
    Exponential {
        /// Decay factor per accepted step.
        #[serde(default = "default_cooldown_lambda")]
        lambda: f64,
    },
    /// Aarts-Korst adaptive schedule.
    AartsKorst {
        /// Cost buffer capacity.
        #[serde(default = "default_window")]
        window: usize,
        /// Distance parameter.
        #[serde(default = "default_aarts_korst_lambda")]
        lambda: f64,
    },
    /// Frost-Heineman adaptive schedule.
    FrostHeineman {
        /// Minimum cost buffer length.
        #[serde(default = "default_window")]
        window: usize,
        /// Target decrement in units of the cost spread.
        #[serde(default = "default_frost_heineman_lambda")]
        lambda: f64,
    },
}

fn default_cooldown_lambda() -> f64 {
    DEFAULT_LAMBDA
}

fn default_window() -> usize {
    15
}

fn default_aarts_korst_lambda() -> f64 {
    0.01
}

fn default_frost_heineman_lambda() -> f64 {
    0.1
}

impl Default for CooldownSpec {
    fn default() -> Self {
        CooldownSpec::Exponential {
            lambda: default_cooldown_lambda(),
        }
    }
}

impl CooldownSpec {
    /// Builds the schedule with fresh buffer state.
    pub fn build(&self) -> Result<Cooldown, RematError> {
        match self {
            CooldownSpec::Exponential { lambda } => Cooldown::exponential(*lambda),
            CooldownSpec::AartsKorst { window, lambda } => Cooldown::aarts_korst(*window, *lambda),
            CooldownSpec::FrostHeineman { window, lambda } => {
                Cooldown::frost_heineman(*window, *lambda)
            }
        }
    }
}

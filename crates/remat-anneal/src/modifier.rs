//! Mutation strategies: flip one site or swap two sites of opposing phase.

use remat_core::errors::{ErrorInfo, RematError};
use remat_core::{opposite, RngHandle, Tracker};

use crate::sampler::Sampler;

/// Redraw budget for the swapper's search for an opposing-phase partner.
pub const SWAP_MAX_RETRIES: usize = 1024;

/// Undo record for one proposal. Swap tokens are applied in reverse order
/// so the tracker's intermediate states mirror the forward path.
#[derive(Debug)]
pub enum Proposal<K> {
    /// One site was flipped.
    Flip {
        /// Linear index of the flipped site.
        index: usize,
        /// Tracker token reversing the write.
        token: K,
    },
    /// Two sites of opposing phase exchanged values.
    Swap {
        /// Linear index written first.
        first_index: usize,
        /// Tracker token for the first write.
        first_token: K,
        /// Linear index written second.
        second_index: usize,
        /// Tracker token for the second write.
        second_token: K,
    },
}

/// Proposes local grid mutations through a tracker, using a sampler to pick
/// the sites. Every tracker write is bracketed by the sampler's
/// `update_pre`/`update_post` notifications, in both directions.
#[derive(Debug, Clone)]
pub enum Modifier {
    /// Flips the phase of one sampled site.
    Flipper(Sampler),
    /// Swaps the phases of two sampled sites of opposing phase, preserving
    /// the bulk phase fraction exactly.
    Swapper(Sampler),
}

impl Modifier {
    /// Flip modifier over the given sampler.
    pub fn flipper(sampler: Sampler) -> Self {
        Modifier::Flipper(sampler)
    }

    /// Swap modifier over the given sampler.
    pub fn swapper(sampler: Sampler) -> Self {
        Modifier::Swapper(sampler)
    }

    /// The sampler this modifier draws sites from.
    pub fn sampler(&self) -> &Sampler {
        match self {
            Modifier::Flipper(sampler) | Modifier::Swapper(sampler) => sampler,
        }
    }

    /// Proposes one mutation, returning the token that undoes it.
    pub fn modify<T: Tracker>(
        &mut self,
        tracker: &mut T,
        rng: &mut RngHandle,
    ) -> Result<Proposal<T::Token>, RematError> {
        match self {
            Modifier::Flipper(sampler) => {
                let index = sampler.sample(tracker.grid(), rng)?;
                let value = opposite(tracker.read(index));
                let token = write_through(sampler, tracker, value, index)?;
                Ok(Proposal::Flip { index, token })
            }
            Modifier::Swapper(sampler) => {
                let first_index = sampler.sample(tracker.grid(), rng)?;
                let first_phase = tracker.read(first_index);
                let mut partner = None;
                for _ in 0..SWAP_MAX_RETRIES {
                    let candidate = sampler.sample(tracker.grid(), rng)?;
                    if tracker.read(candidate) != first_phase {
                        partner = Some(candidate);
                        break;
                    }
                }
                let second_index = partner.ok_or_else(|| {
                    RematError::Sampler(
                        ErrorInfo::new(
                            "no-opposite-phase",
                            "no opposing-phase partner found within the retry budget",
                        )
                        .with_context("retries", SWAP_MAX_RETRIES.to_string())
                        .with_hint("swapping needs both phases present in the grid"),
                    )
                })?;
                let second_phase = tracker.read(second_index);
                let first_token = write_through(sampler, tracker, second_phase, first_index)?;
                let second_token = write_through(sampler, tracker, first_phase, second_index)?;
                Ok(Proposal::Swap {
                    first_index,
                    first_token,
                    second_index,
                    second_token,
                })
            }
        }
    }

    /// Reverses a proposal, rewinding the tracker and the sampler state.
    pub fn reject<T: Tracker>(
        &mut self,
        tracker: &mut T,
        proposal: Proposal<T::Token>,
    ) -> Result<(), RematError> {
        let sampler = match self {
            Modifier::Flipper(sampler) | Modifier::Swapper(sampler) => sampler,
        };
        match proposal {
            Proposal::Flip { index, token } => rollback_through(sampler, tracker, token, index),
            Proposal::Swap {
                first_index,
                first_token,
                second_index,
                second_token,
            } => {
                rollback_through(sampler, tracker, second_token, second_index)?;
                rollback_through(sampler, tracker, first_token, first_index)
            }
        }
    }
}

fn write_through<T: Tracker>(
    sampler: &mut Sampler,
    tracker: &mut T,
    value: u8,
    index: usize,
) -> Result<T::Token, RematError> {
    sampler.update_pre(tracker.grid(), index)?;
    let token = tracker.update(value, index)?;
    sampler.update_post(tracker.grid(), index)?;
    Ok(token)
}

fn rollback_through<T: Tracker>(
    sampler: &mut Sampler,
    tracker: &mut T,
    token: T::Token,
    index: usize,
) -> Result<(), RematError> {
    sampler.update_pre(tracker.grid(), index)?;
    tracker.rollback(token)?;
    sampler.update_post(tracker.grid(), index)?;
    Ok(())
}

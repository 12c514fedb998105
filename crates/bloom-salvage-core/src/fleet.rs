//! Escalating search for the smallest fleet that keeps integrity positive.

use crate::config::MissionConfig;
use crate::grid::{DriftField, PresenceMask};
use crate::mission::{
    validate_inputs, CancelToken, FleetReport, MissionInitError, Outcome, Trial, TrialResult,
};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FleetSearchError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] MissionInitError),
    #[error("no fleet size up to {ceiling} keeps integrity positive over the horizon")]
    ResourceExhausted { ceiling: usize },
    #[error("search cancelled while evaluating fleet size {fleet_size}")]
    Cancelled { fleet_size: usize },
}

/// Fleet size that can clear every occupied cell in a single step.
///
/// Advection never increases the occupied count and salvage only removes, so
/// with this capacity the outer ring is emptied every step and the trial cannot
/// fail. Used when no explicit ceiling is configured.
pub fn derived_ceiling(initial_mask: &PresenceMask, per_boat_capacity: usize) -> usize {
    if per_boat_capacity == 0 {
        return 1;
    }
    initial_mask
        .occupied_count()
        .div_ceil(per_boat_capacity)
        .max(1)
}

pub struct FleetSizer<'a> {
    initial_mask: &'a PresenceMask,
    field: &'a DriftField,
    config: &'a MissionConfig,
    cancel: Option<CancelToken>,
}

impl<'a> FleetSizer<'a> {
    /// Validates inputs up front so a bad scenario fails before any step runs.
    pub fn new(
        initial_mask: &'a PresenceMask,
        field: &'a DriftField,
        config: &'a MissionConfig,
    ) -> Result<Self, FleetSearchError> {
        validate_inputs(initial_mask, field, config)?;
        Ok(Self {
            initial_mask,
            field,
            config,
            cancel: None,
        })
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn ceiling(&self) -> usize {
        self.config.search.max_fleet_size.unwrap_or_else(|| {
            derived_ceiling(self.initial_mask, self.config.schedule.per_boat_capacity)
        })
    }

    /// Run a single candidate on a fresh copy of the initial mask. Inputs were
    /// validated once in [`FleetSizer::new`].
    pub fn run_candidate(&self, fleet_size: usize) -> Result<TrialResult, FleetSearchError> {
        let mut trial =
            Trial::from_validated(self.initial_mask, self.field, self.config, fleet_size)?;
        if let Some(token) = &self.cancel {
            trial = trial.with_cancel_token(token.clone());
        }
        Ok(trial.run())
    }

    /// Try `N = 1, 2, ...` up to the ceiling and return the first success.
    ///
    /// With `parallel_window > 1` each round evaluates that many consecutive
    /// candidates concurrently; results are scanned in ascending fleet size, so
    /// the answer never depends on which trial finished first.
    pub fn search(&self) -> Result<FleetReport, FleetSearchError> {
        let ceiling = self.ceiling();
        let window = self.config.search.parallel_window.max(1);
        debug!(
            ceiling,
            window,
            occupied = self.initial_mask.occupied_count(),
            "starting fleet search"
        );

        let mut trials = Vec::new();
        let mut next = 1usize;
        while next <= ceiling {
            let last = next.saturating_add(window - 1).min(ceiling);
            let round = if window == 1 {
                vec![self.run_candidate(next)?]
            } else {
                (next..=last)
                    .into_par_iter()
                    .map(|n| self.run_candidate(n))
                    .collect::<Result<Vec<_>, _>>()?
            };

            for trial in round {
                debug!(
                    fleet_size = trial.fleet_size,
                    outcome = ?trial.outcome,
                    step = trial.terminal_step,
                    integrity = trial.final_integrity,
                    "trial finished"
                );
                match trial.outcome {
                    Outcome::Success => {
                        let min_fleet_size = trial.fleet_size;
                        trials.push(trial);
                        info!(min_fleet_size, ceiling, "fleet search succeeded");
                        return Ok(FleetReport {
                            schema_version: 1,
                            min_fleet_size,
                            ceiling,
                            trials,
                        });
                    }
                    Outcome::Cancelled | Outcome::Running => {
                        return Err(FleetSearchError::Cancelled {
                            fleet_size: trial.fleet_size,
                        });
                    }
                    Outcome::Breach | Outcome::Exhausted => trials.push(trial),
                }
            }
            next = last + 1;
        }

        warn!(ceiling, "no fleet size within the ceiling succeeded");
        Err(FleetSearchError::ResourceExhausted { ceiling })
    }
}

/// Smallest fleet size whose trial ends in [`Outcome::Success`].
pub fn find_minimum_fleet(
    initial_mask: &PresenceMask,
    field: &DriftField,
    config: &MissionConfig,
) -> Result<FleetReport, FleetSearchError> {
    FleetSizer::new(initial_mask, field, config)?.search()
}

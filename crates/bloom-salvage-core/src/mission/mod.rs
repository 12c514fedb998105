pub mod metrics;
pub mod observer;
mod step;

pub use metrics::*;
pub use observer::*;

use crate::config::{ConfigError, MissionConfig, ZoneRadii};
use crate::grid::{DriftField, GridError, PresenceMask};
use crate::salvage;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MissionInitError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("fleet size must be at least 1")]
    ZeroFleetSize,
    #[error("fleet size {fleet_size} times per-boat capacity {per_boat} overflows usize")]
    CapacityOverflow { fleet_size: usize, per_boat: usize },
    #[error("intake ({x}, {y}) lies outside the {width}x{height} grid")]
    IntakeOutOfBounds {
        x: u32,
        y: u32,
        width: usize,
        height: usize,
    },
}

/// Trial state. `Running` is the only non-terminal value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Running,
    /// Integrity stayed positive through the whole horizon.
    Success,
    /// Bloom entered the inner alert ring.
    Breach,
    /// Accumulated ring exposure drove integrity to zero.
    Exhausted,
    /// Stopped by a [`CancelToken`] before the horizon ended.
    Cancelled,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        self != Outcome::Running
    }

    pub fn is_success(self) -> bool {
        self == Outcome::Success
    }
}

/// Per-trial mutable state, threaded through every step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimState {
    integrity: i32,
    step: usize,
    outcome: Outcome,
    removed_last_step: usize,
    exposure_last_step: usize,
}

impl SimState {
    fn new(initial_integrity: i32) -> Self {
        Self {
            integrity: initial_integrity,
            step: 0,
            outcome: Outcome::Running,
            removed_last_step: 0,
            exposure_last_step: 0,
        }
    }

    pub fn integrity(&self) -> i32 {
        self.integrity
    }

    /// Index of the last completed step; 0 before the first advection.
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Cells salvaged during the last completed step.
    pub fn removed_last_step(&self) -> usize {
        self.removed_last_step
    }

    /// Cells in the outer-but-not-inner ring after the last completed step.
    pub fn exposure_last_step(&self) -> usize {
        self.exposure_last_step
    }

    /// Subtract exposure, clamped at zero.
    fn deplete(&mut self, exposure: usize) {
        let exposure = i32::try_from(exposure).unwrap_or(i32::MAX);
        self.integrity = self.integrity.saturating_sub(exposure).max(0);
    }

    fn finish(&mut self, outcome: Outcome) {
        debug_assert!(!self.outcome.is_terminal(), "outcome already terminal");
        self.outcome = outcome;
    }
}

/// Cooperative cancellation flag shared between a trial and its controller.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Checks shared by every trial of a search: configuration, raster
/// dimensions and intake placement.
pub fn validate_inputs(
    initial_mask: &PresenceMask,
    field: &DriftField,
    config: &MissionConfig,
) -> Result<(), MissionInitError> {
    config.validate()?;
    field.ensure_matches(initial_mask)?;
    let intake = config.zone.intake;
    if !initial_mask.in_bounds(intake) {
        return Err(MissionInitError::IntakeOutOfBounds {
            x: intake.x,
            y: intake.y,
            width: initial_mask.width(),
            height: initial_mask.height(),
        });
    }
    Ok(())
}

/// One mission run for a fixed fleet size.
///
/// Construction performs the baseline cleanup of the outer alert ring; each
/// [`Trial::step`] then advects, salvages and assesses the rings in that order.
/// Once the outcome is terminal further calls to `step` do nothing.
pub struct Trial<'a> {
    field: &'a DriftField,
    config: &'a MissionConfig,
    radii: ZoneRadii,
    num_steps: usize,
    fleet_size: usize,
    capacity: usize,
    mask: PresenceMask,
    state: SimState,
    initial_cleanup: usize,
    removed_total: usize,
    cancel: Option<CancelToken>,
}

impl<'a> Trial<'a> {
    pub fn new(
        initial_mask: &PresenceMask,
        field: &'a DriftField,
        config: &'a MissionConfig,
        fleet_size: usize,
    ) -> Result<Self, MissionInitError> {
        validate_inputs(initial_mask, field, config)?;
        Self::from_validated(initial_mask, field, config, fleet_size)
    }

    /// Construction for inputs that already passed [`validate_inputs`].
    pub(crate) fn from_validated(
        initial_mask: &PresenceMask,
        field: &'a DriftField,
        config: &'a MissionConfig,
        fleet_size: usize,
    ) -> Result<Self, MissionInitError> {
        if fleet_size == 0 {
            return Err(MissionInitError::ZeroFleetSize);
        }
        let per_boat = config.schedule.per_boat_capacity;
        let capacity = fleet_size
            .checked_mul(per_boat)
            .ok_or(MissionInitError::CapacityOverflow {
                fleet_size,
                per_boat,
            })?;

        let intake = config.zone.intake;
        let radii = config.radii_cells();
        let mut mask = initial_mask.clone();
        let initial_cleanup = salvage::clear_zone(&mut mask, intake, radii.outer);

        Ok(Self {
            field,
            config,
            radii,
            num_steps: config.schedule.num_steps(),
            fleet_size,
            capacity,
            mask,
            state: SimState::new(config.schedule.initial_integrity),
            initial_cleanup,
            removed_total: 0,
            cancel: None,
        })
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn mask(&self) -> &PresenceMask {
        &self.mask
    }

    /// Cells cleared by the baseline cleanup at construction.
    pub fn initial_cleanup(&self) -> usize {
        self.initial_cleanup
    }

    pub fn is_finished(&self) -> bool {
        self.state.outcome.is_terminal()
    }

    /// View of the last completed step, for observers.
    pub fn snapshot(&self) -> StepSnapshot<'_> {
        StepSnapshot {
            step: self.state.step,
            elapsed_minutes: self.state.step as f64 * self.config.schedule.step_minutes,
            fleet_size: self.fleet_size,
            integrity: self.state.integrity,
            outcome: self.state.outcome,
            removed: self.state.removed_last_step,
            exposure: self.state.exposure_last_step,
            mask: &self.mask,
        }
    }

    pub fn result(&self) -> TrialResult {
        TrialResult {
            fleet_size: self.fleet_size,
            outcome: self.state.outcome,
            terminal_step: self.state.step,
            final_integrity: self.state.integrity,
            initial_cleanup: self.initial_cleanup,
            removed_total: self.removed_total,
        }
    }

    /// Step to a terminal outcome without observing.
    pub fn run(self) -> TrialResult {
        self.run_observed(&mut NoopObserver)
    }

    /// Step to a terminal outcome, handing each completed step to `observer`.
    /// The observer sees the state but cannot influence it.
    pub fn run_observed(mut self, observer: &mut dyn StepObserver) -> TrialResult {
        while !self.is_finished() {
            let before = self.state.step;
            self.step();
            if self.state.step != before {
                observer.on_step(&self.snapshot());
            }
        }
        self.result()
    }
}

/// Run one trial for `fleet_size` boats on a private copy of `initial_mask`.
pub fn run_trial(
    initial_mask: &PresenceMask,
    field: &DriftField,
    config: &MissionConfig,
    fleet_size: usize,
) -> Result<TrialResult, MissionInitError> {
    Ok(Trial::new(initial_mask, field, config, fleet_size)?.run())
}

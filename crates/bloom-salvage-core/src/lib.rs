//! Drift-and-salvage simulation for floating bloom near a protected water intake.
//!
//! A presence mask is advected through fixed time steps by a drift field, boats
//! clear the cells nearest the intake, and two alert rings decide whether the
//! intake's integrity survives the horizon. [`fleet::find_minimum_fleet`]
//! searches for the smallest fleet that keeps it positive.

pub mod config;
pub mod drift;
pub mod fleet;
pub mod forecast;
pub mod grid;
pub mod mission;
pub mod salvage;
pub mod scenario;
pub mod spatial;
pub mod zone;

pub use config::{ConfigError, ForecastConfig, MissionConfig, ScheduleConfig, SearchConfig, ZoneConfig};
pub use fleet::{find_minimum_fleet, FleetSearchError, FleetSizer};
pub use forecast::{forecast_arrivals, ArrivalWarning, Landmark, LandmarkKind};
pub use grid::{Cell, DriftField, GridError, PresenceMask};
pub use mission::{
    run_trial, CancelToken, FleetReport, MissionInitError, Outcome, SimState, StepObserver,
    StepRecord, Trial, TrialResult,
};
pub use scenario::{synthetic_bloom, DriftSpec, ScenarioFile};

use crate::grid::Cell;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("resolution_m must be positive and finite (got {0})")]
    InvalidResolution(f64),
    #[error("first_alert_radius_m ({first}) must be positive and less than second_alert_radius_m ({second})")]
    InvalidAlertRadii { first: f64, second: f64 },
    #[error("alert radii collapse to {inner_cells} and {outer_cells} cells at this resolution")]
    DegenerateAlertRadii { inner_cells: f64, outer_cells: f64 },
    #[error("step_minutes must be positive and finite (got {0})")]
    InvalidStep(f64),
    #[error("horizon_hours must be positive and finite (got {0})")]
    InvalidHorizon(f64),
    #[error("horizon needs {actual} steps, exceeding the supported maximum ({max})")]
    TooManySteps { max: usize, actual: f64 },
    #[error("per_boat_capacity must be positive")]
    ZeroCapacity,
    #[error("initial_integrity must be in 1..={max} (got {actual})")]
    InvalidIntegrity { max: i32, actual: i32 },
    #[error("parallel_window must be positive")]
    ZeroParallelWindow,
    #[error("max_fleet_size must be positive when set")]
    ZeroFleetCeiling,
}

/// Protected intake and its two alert rings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    /// Intake cell
    pub intake: Cell,
    /// Inner (critical) ring [m]
    pub first_alert_radius_m: f64,
    /// Outer (advisory) ring [m]
    pub second_alert_radius_m: f64,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            intake: Cell::new(758, 498),
            first_alert_radius_m: 500.0,
            second_alert_radius_m: 1000.0,
        }
    }
}

/// Alert radii converted to cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneRadii {
    pub inner: f64,
    pub outer: f64,
}

impl ZoneConfig {
    /// Radii in whole cells, truncated toward zero (500 m at 50 m/cell is 10 cells).
    pub fn radii_cells(&self, resolution_m: f64) -> ZoneRadii {
        ZoneRadii {
            inner: (self.first_alert_radius_m / resolution_m).floor(),
            outer: (self.second_alert_radius_m / resolution_m).floor(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Simulation step [min]
    pub step_minutes: f64,
    /// Protection horizon [h]
    pub horizon_hours: f64,
    /// Cells one boat clears per step
    pub per_boat_capacity: usize,
    /// Integrity at the start of every trial
    pub initial_integrity: i32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            step_minutes: 20.0,
            horizon_hours: 6.0,
            per_boat_capacity: 30,
            initial_integrity: ScheduleConfig::MAX_INTEGRITY,
        }
    }
}

impl ScheduleConfig {
    pub const MAX_INTEGRITY: i32 = 100;
    pub const MAX_STEPS: usize = 1_000_000;

    pub fn num_steps(&self) -> usize {
        (self.horizon_hours * 60.0 / self.step_minutes).ceil() as usize
    }

    pub fn dt_hours(&self) -> f64 {
        self.step_minutes / 60.0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.step_minutes.is_finite() && self.step_minutes > 0.0) {
            return Err(ConfigError::InvalidStep(self.step_minutes));
        }
        if !(self.horizon_hours.is_finite() && self.horizon_hours > 0.0) {
            return Err(ConfigError::InvalidHorizon(self.horizon_hours));
        }
        let steps = (self.horizon_hours * 60.0 / self.step_minutes).ceil();
        if steps > Self::MAX_STEPS as f64 {
            return Err(ConfigError::TooManySteps {
                max: Self::MAX_STEPS,
                actual: steps,
            });
        }
        if self.per_boat_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if !(1..=Self::MAX_INTEGRITY).contains(&self.initial_integrity) {
            return Err(ConfigError::InvalidIntegrity {
                max: Self::MAX_INTEGRITY,
                actual: self.initial_integrity,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Largest fleet size tried. `None` derives a ceiling from the bloom size.
    pub max_fleet_size: Option<usize>,
    /// Candidate fleet sizes evaluated concurrently per round; 1 is sequential.
    pub parallel_window: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_fleet_size: None,
            parallel_window: 1,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parallel_window == 0 {
            return Err(ConfigError::ZeroParallelWindow);
        }
        if self.max_fleet_size == Some(0) {
            return Err(ConfigError::ZeroFleetCeiling);
        }
        Ok(())
    }
}

/// Everything a trial needs besides the rasters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    /// Grid scale [m/cell]
    pub resolution_m: f64,
    pub zone: ZoneConfig,
    pub schedule: ScheduleConfig,
    pub search: SearchConfig,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            resolution_m: 50.0,
            zone: ZoneConfig::default(),
            schedule: ScheduleConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl MissionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.resolution_m.is_finite() && self.resolution_m > 0.0) {
            return Err(ConfigError::InvalidResolution(self.resolution_m));
        }
        let first = self.zone.first_alert_radius_m;
        let second = self.zone.second_alert_radius_m;
        if !(first.is_finite() && second.is_finite() && first > 0.0 && first < second) {
            return Err(ConfigError::InvalidAlertRadii { first, second });
        }
        let radii = self.zone.radii_cells(self.resolution_m);
        if radii.inner >= radii.outer {
            return Err(ConfigError::DegenerateAlertRadii {
                inner_cells: radii.inner,
                outer_cells: radii.outer,
            });
        }
        self.schedule.validate()?;
        self.search.validate()
    }

    pub fn radii_cells(&self) -> ZoneRadii {
        self.zone.radii_cells(self.resolution_m)
    }
}

/// Time grid for the landmark arrival forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Forecast horizon [h]
    pub horizon_hours: f64,
    /// Sampling interval [min]
    pub step_minutes: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_hours: 8.0,
            step_minutes: 20.0,
        }
    }
}

impl ForecastConfig {
    /// Number of sampled intervals; times `0..=num_steps` are evaluated.
    pub fn num_steps(&self) -> usize {
        (self.horizon_hours * 60.0 / self.step_minutes).floor() as usize
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.step_minutes.is_finite() && self.step_minutes > 0.0) {
            return Err(ConfigError::InvalidStep(self.step_minutes));
        }
        if !(self.horizon_hours.is_finite() && self.horizon_hours >= 0.0) {
            return Err(ConfigError::InvalidHorizon(self.horizon_hours));
        }
        let steps = (self.horizon_hours * 60.0 / self.step_minutes).floor();
        if steps > ScheduleConfig::MAX_STEPS as f64 {
            return Err(ConfigError::TooManySteps {
                max: ScheduleConfig::MAX_STEPS,
                actual: steps,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(MissionConfig::default().validate(), Ok(()));
        assert_eq!(ForecastConfig::default().validate(), Ok(()));
    }

    #[test]
    fn default_schedule_has_eighteen_steps() {
        let schedule = ScheduleConfig::default();
        assert_eq!(schedule.num_steps(), 18);
        assert!((schedule.dt_hours() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn partial_final_step_rounds_up() {
        let schedule = ScheduleConfig {
            step_minutes: 25.0,
            horizon_hours: 1.0,
            ..ScheduleConfig::default()
        };
        assert_eq!(schedule.num_steps(), 3);
    }

    #[test]
    fn radii_truncate_to_whole_cells() {
        let radii = ZoneConfig::default().radii_cells(50.0);
        assert_eq!(radii, ZoneRadii { inner: 10.0, outer: 20.0 });
        let radii = ZoneConfig::default().radii_cells(30.0);
        assert_eq!(radii, ZoneRadii { inner: 16.0, outer: 33.0 });
    }

    #[test]
    fn rejects_non_positive_resolution() {
        for resolution_m in [0.0, -50.0, f64::NAN] {
            let config = MissionConfig {
                resolution_m,
                ..MissionConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidResolution(_))
            ));
        }
    }

    #[test]
    fn rejects_inverted_radii() {
        let config = MissionConfig {
            zone: ZoneConfig {
                first_alert_radius_m: 1000.0,
                second_alert_radius_m: 1000.0,
                ..ZoneConfig::default()
            },
            ..MissionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAlertRadii { .. })
        ));
    }

    #[test]
    fn rejects_radii_that_collapse_after_conversion() {
        let config = MissionConfig {
            resolution_m: 2000.0,
            ..MissionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DegenerateAlertRadii { .. })
        ));
    }

    #[test]
    fn rejects_bad_schedule_and_search() {
        let mut config = MissionConfig::default();
        config.schedule.per_boat_capacity = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroCapacity));

        let mut config = MissionConfig::default();
        config.schedule.initial_integrity = 101;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidIntegrity { .. })
        ));

        let mut config = MissionConfig::default();
        config.search.parallel_window = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroParallelWindow));

        let mut config = MissionConfig::default();
        config.search.max_fleet_size = Some(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroFleetCeiling));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: MissionConfig =
            serde_json::from_str(r#"{"resolution_m": 30.0, "schedule": {"horizon_hours": 2.0}}"#)
                .unwrap();
        assert_eq!(config.resolution_m, 30.0);
        assert_eq!(config.schedule.horizon_hours, 2.0);
        assert_eq!(config.schedule.per_boat_capacity, 30);
        assert_eq!(config.zone, ZoneConfig::default());
    }
}

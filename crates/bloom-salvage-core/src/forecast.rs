//! First-arrival warnings for named landmarks under free drift (no salvage).

use crate::config::{ConfigError, ForecastConfig};
use crate::drift;
use crate::grid::{Cell, DriftField, GridError, PresenceMask};
use crate::zone::ZoneMonitor;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Grid(#[from] GridError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkKind {
    WaterIntake,
    ScenicSpot,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub name: String,
    pub kind: LandmarkKind,
    pub cell: Cell,
    /// 0 means the landmark cell itself must be occupied.
    #[serde(default)]
    pub warning_radius_cells: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArrivalWarning {
    pub name: String,
    pub kind: LandmarkKind,
    pub cell: Cell,
    pub step: usize,
    pub elapsed_hours: f64,
}

/// Report the first sampled time at which bloom reaches each landmark.
///
/// Each sample advects the *initial* mask in one jump by the elapsed time,
/// rather than iterating step by step. Landmarks outside the grid are skipped.
/// Warnings are ordered by step, then by landmark input order.
pub fn forecast_arrivals(
    initial_mask: &PresenceMask,
    field: &DriftField,
    resolution_m: f64,
    landmarks: &[Landmark],
    config: &ForecastConfig,
) -> Result<Vec<ArrivalWarning>, ForecastError> {
    config.validate()?;
    field.ensure_matches(initial_mask)?;
    if !(resolution_m.is_finite() && resolution_m > 0.0) {
        return Err(ConfigError::InvalidResolution(resolution_m).into());
    }

    let mut pending: Vec<&Landmark> = landmarks
        .iter()
        .filter(|l| initial_mask.in_bounds(l.cell))
        .collect();
    let mut warnings = Vec::new();

    for step in 0..=config.num_steps() {
        if pending.is_empty() {
            break;
        }
        let elapsed_hours = step as f64 * config.step_minutes / 60.0;
        let predicted = drift::try_advect(initial_mask, field, elapsed_hours, resolution_m)?;
        let monitor = ZoneMonitor::new(&predicted);

        pending.retain(|landmark| {
            if !monitor.any_in_zone(landmark.cell, landmark.warning_radius_cells) {
                return true;
            }
            debug!(landmark = %landmark.name, step, elapsed_hours, "bloom reaches landmark");
            warnings.push(ArrivalWarning {
                name: landmark.name.clone(),
                kind: landmark.kind,
                cell: landmark.cell,
                step,
                elapsed_hours,
            });
            false
        });
    }
    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn landmark(name: &str, kind: LandmarkKind, x: u32, y: u32) -> Landmark {
        Landmark {
            name: name.to_string(),
            kind,
            cell: Cell::new(x, y),
            warning_radius_cells: 0.0,
        }
    }

    #[test]
    fn reports_first_arrival_once_in_time_order() {
        // 6 cells per 20 minutes at 50 m/cell
        let mask = PresenceMask::from_cells(200, 10, [Cell::new(0, 5)]).unwrap();
        let field = DriftField::uniform(200, 10, [0.25, 0.0]).unwrap();
        let landmarks = vec![
            landmark("far", LandmarkKind::ScenicSpot, 30, 5),
            landmark("near", LandmarkKind::WaterIntake, 12, 5),
            landmark("missed", LandmarkKind::ScenicSpot, 13, 5),
        ];
        let warnings =
            forecast_arrivals(&mask, &field, 50.0, &landmarks, &ForecastConfig::default()).unwrap();
        let summary: Vec<(&str, usize)> =
            warnings.iter().map(|w| (w.name.as_str(), w.step)).collect();
        assert_eq!(summary, vec![("near", 2), ("far", 5)]);
        assert!((warnings[0].elapsed_hours - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn occupied_landmark_warns_at_time_zero() {
        let mask = PresenceMask::from_cells(10, 10, [Cell::new(4, 4)]).unwrap();
        let field = DriftField::zeros(10, 10).unwrap();
        let warnings = forecast_arrivals(
            &mask,
            &field,
            50.0,
            &[landmark("intake", LandmarkKind::WaterIntake, 4, 4)],
            &ForecastConfig::default(),
        )
        .unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].step, 0);
    }

    #[test]
    fn warning_radius_widens_the_trigger() {
        let mask = PresenceMask::from_cells(10, 10, [Cell::new(4, 4)]).unwrap();
        let field = DriftField::zeros(10, 10).unwrap();
        let mut spot = landmark("shore", LandmarkKind::ScenicSpot, 6, 4);
        let config = ForecastConfig::default();
        assert!(forecast_arrivals(&mask, &field, 50.0, &[spot.clone()], &config)
            .unwrap()
            .is_empty());
        spot.warning_radius_cells = 2.0;
        assert_eq!(
            forecast_arrivals(&mask, &field, 50.0, &[spot], &config)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn huge_warning_radius_triggers_immediately() {
        let mask = PresenceMask::from_cells(10, 10, [Cell::new(0, 9)]).unwrap();
        let field = DriftField::zeros(10, 10).unwrap();
        let mut spot = landmark("everywhere", LandmarkKind::ScenicSpot, 9, 0);
        spot.warning_radius_cells = 1e19;
        let warnings =
            forecast_arrivals(&mask, &field, 50.0, &[spot], &ForecastConfig::default()).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].step, 0);
    }

    #[test]
    fn out_of_grid_landmarks_are_skipped() {
        let mask = PresenceMask::from_cells(10, 10, [Cell::new(9, 9)]).unwrap();
        let field = DriftField::uniform(10, 10, [10.0, 10.0]).unwrap();
        let warnings = forecast_arrivals(
            &mask,
            &field,
            50.0,
            &[landmark("offshore", LandmarkKind::ScenicSpot, 10, 9)],
            &ForecastConfig::default(),
        )
        .unwrap();
        assert!(warnings.is_empty());
    }
}

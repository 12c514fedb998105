//! JSON scenario files and a seeded synthetic bloom generator.

use crate::config::{ForecastConfig, MissionConfig};
use crate::forecast::Landmark;
use crate::grid::{Cell, DriftField, GridError, PresenceMask};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};

/// How the drift field is supplied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DriftSpec {
    /// Same velocity [m/s] everywhere.
    Uniform { velocity: [f64; 2] },
    /// Row-major velocities [m/s].
    Grid { velocity: Vec<[f64; 2]> },
    /// Row-major pixel displacements measured over `interval_seconds`.
    PixelFlow {
        flow: Vec<[f64; 2]>,
        interval_seconds: f64,
    },
}

impl Default for DriftSpec {
    fn default() -> Self {
        DriftSpec::Uniform {
            velocity: [0.0, 0.0],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioFile {
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub occupied: Vec<Cell>,
    #[serde(default)]
    pub drift: DriftSpec,
    #[serde(default)]
    pub mission: MissionConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub landmarks: Vec<Landmark>,
}

impl ScenarioFile {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn build_mask(&self) -> Result<PresenceMask, GridError> {
        PresenceMask::from_cells(self.width, self.height, self.occupied.iter().copied())
    }

    /// Pixel flow is converted with the mission's resolution.
    pub fn build_field(&self) -> Result<DriftField, GridError> {
        match &self.drift {
            DriftSpec::Uniform { velocity } => DriftField::uniform(self.width, self.height, *velocity),
            DriftSpec::Grid { velocity } => {
                DriftField::from_vec(self.width, self.height, velocity.clone())
            }
            DriftSpec::PixelFlow {
                flow,
                interval_seconds,
            } => DriftField::from_pixel_flow(
                self.width,
                self.height,
                flow.clone(),
                self.mission.resolution_m,
                *interval_seconds,
            ),
        }
    }
}

/// Random disc-shaped bloom: each cell within `radius` of `center` is occupied
/// with probability `density`. Same seed, same mask.
pub fn synthetic_bloom(
    width: usize,
    height: usize,
    center: Cell,
    radius: f64,
    density: f64,
    seed: u64,
) -> Result<PresenceMask, GridError> {
    let mut mask = PresenceMask::new(width, height)?;
    let mut rng = ChaCha12Rng::seed_from_u64(seed);
    let reach = radius.max(0.0).floor() as i64;
    let r_sq = radius * radius;
    let (cx, cy) = (center.x as i64, center.y as i64);

    for y in (cy - reach).max(0)..=(cy + reach).min(height as i64 - 1) {
        for x in (cx - reach).max(0)..=(cx + reach).min(width as i64 - 1) {
            let (dx, dy) = (x - cx, y - cy);
            if ((dx * dx + dy * dy) as f64) > r_sq {
                continue;
            }
            if rng.random::<f64>() < density {
                mask.insert(Cell::new(x as u32, y as u32));
            }
        }
    }
    Ok(mask)
}

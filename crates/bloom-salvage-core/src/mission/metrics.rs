use super::Outcome;
use serde::{Deserialize, Serialize};

/// Owned per-step record for reporting sinks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: usize,
    pub elapsed_minutes: f64,
    pub fleet_size: usize,
    pub integrity: i32,
    pub outcome: Outcome,
    pub occupied_cells: usize,
    pub removed: usize,
    pub exposure: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialResult {
    pub fleet_size: usize,
    pub outcome: Outcome,
    /// Step at which the outcome became terminal; the horizon step on success.
    pub terminal_step: usize,
    pub final_integrity: i32,
    /// Cells cleared by the unconditional cleanup before step 1.
    pub initial_cleanup: usize,
    /// Cells salvaged across all executed steps.
    pub removed_total: usize,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FleetReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub min_fleet_size: usize,
    /// Largest fleet size the search was allowed to try.
    pub ceiling: usize,
    /// Every evaluated trial up to and including the winner, by fleet size.
    #[serde(default)]
    pub trials: Vec<TrialResult>,
}

impl FleetReport {
    pub fn winning_trial(&self) -> Option<&TrialResult> {
        self.trials
            .iter()
            .find(|t| t.fleet_size == self.min_fleet_size)
    }
}

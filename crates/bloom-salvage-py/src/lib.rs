use bloom_salvage_core::fleet::{find_minimum_fleet, FleetSearchError};
use bloom_salvage_core::forecast::forecast_arrivals;
use bloom_salvage_core::mission::{run_trial, StepRecorder, Trial};
use bloom_salvage_core::{MissionConfig, ScenarioFile};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

/// Python bindings for bloom-salvage-core. Scenarios and reports cross the
/// boundary as JSON strings.
#[pyfunction]
fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[pyfunction]
fn default_config_json() -> PyResult<String> {
    serde_json::to_string_pretty(&MissionConfig::default())
        .map_err(|e| PyRuntimeError::new_err(format!("config serialization failed: {e}")))
}

fn parse_scenario(scenario_json: &str) -> PyResult<ScenarioFile> {
    ScenarioFile::from_json(scenario_json)
        .map_err(|e| PyValueError::new_err(format!("invalid scenario: {e}")))
}

fn to_json<T: serde::Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value)
        .map_err(|e| PyRuntimeError::new_err(format!("report serialization failed: {e}")))
}

/// Minimum fleet search. Returns the fleet report as JSON.
#[pyfunction]
fn find_minimum_fleet_json(scenario_json: &str) -> PyResult<String> {
    let scenario = parse_scenario(scenario_json)?;
    let mask = scenario
        .build_mask()
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    let field = scenario
        .build_field()
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    let report = find_minimum_fleet(&mask, &field, &scenario.mission).map_err(|e| match e {
        FleetSearchError::InvalidInput(_) => PyValueError::new_err(e.to_string()),
        _ => PyRuntimeError::new_err(e.to_string()),
    })?;
    to_json(&report)
}

/// One trial for a fixed fleet size. With `trace=True` the per-step records
/// are returned alongside the result as `{"result": ..., "steps": [...]}`.
#[pyfunction]
#[pyo3(signature = (scenario_json, fleet_size, trace=false))]
fn run_trial_json(scenario_json: &str, fleet_size: usize, trace: bool) -> PyResult<String> {
    let scenario = parse_scenario(scenario_json)?;
    let mask = scenario
        .build_mask()
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    let field = scenario
        .build_field()
        .map_err(|e| PyValueError::new_err(e.to_string()))?;

    if !trace {
        let result = run_trial(&mask, &field, &scenario.mission, fleet_size)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        return to_json(&result);
    }

    let trial = Trial::new(&mask, &field, &scenario.mission, fleet_size)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    let mut recorder = StepRecorder::default();
    let result = trial.run_observed(&mut recorder);
    to_json(&serde_json::json!({
        "result": result,
        "steps": recorder.records,
    }))
}

/// Landmark arrival warnings for the scenario's landmarks.
#[pyfunction]
fn forecast_json(scenario_json: &str) -> PyResult<String> {
    let scenario = parse_scenario(scenario_json)?;
    let mask = scenario
        .build_mask()
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    let field = scenario
        .build_field()
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    let warnings = forecast_arrivals(
        &mask,
        &field,
        scenario.mission.resolution_m,
        &scenario.landmarks,
        &scenario.forecast,
    )
    .map_err(|e| PyValueError::new_err(e.to_string()))?;
    to_json(&warnings)
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add_function(wrap_pyfunction!(default_config_json, m)?)?;
    m.add_function(wrap_pyfunction!(find_minimum_fleet_json, m)?)?;
    m.add_function(wrap_pyfunction!(run_trial_json, m)?)?;
    m.add_function(wrap_pyfunction!(forecast_json, m)?)?;
    Ok(())
}

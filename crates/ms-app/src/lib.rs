//! Shared application service layer for motorsim.
//!
//! Centralizes scenario loading, compilation into solver inputs, cached run
//! execution and result queries for the CLI.

pub mod error;
pub mod progress;
pub mod project_service;
pub mod query;
pub mod run_service;
pub mod scenario_compile;

pub use error::{AppError, AppResult};
pub use progress::{IntegrationProgress, RunProgressEvent, RunStage};
pub use project_service::{
    ScenarioSummary, get_scenario, list_scenarios, load_project, save_project, validate_project,
};
pub use query::{RunSummary, VARIABLES, extract_series, get_run_summary, step_size_series};
pub use run_service::{
    LoadedRun, RunOptions, RunRequest, RunResponse, RunTimingSummary, ScenarioOutcome,
    ensure_all_runs, ensure_run, ensure_run_with_progress, list_runs, load_run,
};
pub use scenario_compile::{ScenarioRuntime, compile_constants, compile_scenario};

//! Project loading, saving, validation, and introspection.

use std::path::Path;

use ms_project::schema::{LoadDef, MethodDef, Project, ScenarioDef};

use crate::error::{AppError, AppResult};

/// Summary of a scenario for listing.
#[derive(Debug, Clone)]
pub struct ScenarioSummary {
    pub id: String,
    pub name: String,
    pub load: String,
    pub t_start_s: f64,
    pub t_end_s: f64,
    pub method: String,
}

/// Load a project from YAML (or JSON by extension); the file is validated.
pub fn load_project(path: &Path) -> AppResult<Project> {
    Ok(ms_project::load_project_file(path)?)
}

/// Save a project, as JSON for `.json` paths and YAML otherwise.
pub fn save_project(path: &Path, project: &Project) -> AppResult<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => ms_project::save_json(path, project)?,
        _ => ms_project::save_yaml(path, project)?,
    }
    Ok(())
}

/// Validate project structure.
pub fn validate_project(project: &Project) -> AppResult<()> {
    ms_project::validate_project(project).map_err(|e| AppError::Validation(e.to_string()))?;

    if project.scenarios.is_empty() {
        return Err(AppError::Validation(
            "Project must have at least one scenario".to_string(),
        ));
    }

    Ok(())
}

/// List all scenarios in the project with summaries.
pub fn list_scenarios(project: &Project) -> Vec<ScenarioSummary> {
    project
        .scenarios
        .iter()
        .map(|scenario| ScenarioSummary {
            id: scenario.id.clone(),
            name: scenario.name.clone(),
            load: match scenario.load {
                LoadDef::Zero => "none".to_string(),
                LoadDef::Sinusoidal {
                    amplitude_n_m,
                    bias,
                } => format!("{amplitude_n_m} N·m · ({bias} + sin t)"),
            },
            t_start_s: scenario.time_span.start_s,
            t_end_s: scenario.time_span.end_s,
            method: match scenario.solver.method {
                MethodDef::DormandPrince54 => "DormandPrince54".to_string(),
                MethodDef::BogackiShampine32 => "BogackiShampine32".to_string(),
            },
        })
        .collect()
}

/// Get a specific scenario by ID.
pub fn get_scenario<'a>(project: &'a Project, scenario_id: &str) -> AppResult<&'a ScenarioDef> {
    project
        .scenario(scenario_id)
        .ok_or_else(|| AppError::ScenarioNotFound(scenario_id.to_string()))
}

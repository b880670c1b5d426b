use std::path::Path;

use ms_app::{AppError, get_scenario, list_scenarios, load_project, validate_project};

fn bundled() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../scenarios/battery_motor.yaml")
}

#[test]
fn bundled_project_lists_scenarios() {
    let project = load_project(&bundled()).unwrap();
    validate_project(&project).unwrap();

    let summaries = list_scenarios(&project);
    let ids: Vec<&str> = summaries.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, ["no_load", "sinusoidal_load"]);
    assert_eq!(summaries[0].load, "none");
    assert_eq!(summaries[1].t_end_s, 60.0);

    assert_eq!(get_scenario(&project, "no_load").unwrap().name, "Free spin-up");
    assert!(matches!(
        get_scenario(&project, "missing").unwrap_err(),
        AppError::ScenarioNotFound(_)
    ));
}

#[test]
fn empty_project_fails_validation() {
    let mut project = load_project(&bundled()).unwrap();
    project.scenarios.clear();
    assert!(matches!(
        validate_project(&project).unwrap_err(),
        AppError::Validation(_)
    ));
}

#[test]
fn missing_file_is_a_project_error() {
    let err = load_project(Path::new("/nonexistent/motorsim/project.yaml")).unwrap_err();
    assert!(matches!(err, AppError::Project(_)));
}

use std::fs;

use ms_results::*;

fn manifest(run_id: &str, scenario_id: &str, timestamp: &str) -> RunManifest {
    RunManifest {
        run_id: run_id.to_string(),
        scenario_id: scenario_id.to_string(),
        timestamp: timestamp.to_string(),
        solver_version: "0.1.0".to_string(),
        method: "dormand-prince-5(4)".to_string(),
        atol: 1e-6,
        rtol: 1e-3,
        t_start_s: 0.0,
        t_end_s: 60.0,
        accepted_steps: 2,
        rejected_steps: 1,
        rhs_evals: 20,
    }
}

fn sample(time_s: f64, omega_rad_s: f64) -> SampleRecord {
    SampleRecord {
        time_s,
        current_a: 10.0,
        omega_rad_s,
        v1_v: 0.05,
        soc: 0.99,
        terminal_v: 3.6,
    }
}

fn steps() -> Vec<StepRecord> {
    vec![
        StepRecord {
            time_s: 0.0,
            step_s: None,
            current_a: 0.0,
            omega_rad_s: 0.0,
            v1_v: 0.0,
            soc: 1.0,
        },
        StepRecord {
            time_s: 0.5,
            step_s: Some(0.5),
            current_a: 30.0,
            omega_rad_s: 0.1,
            v1_v: 0.01,
            soc: 0.999,
        },
    ]
}

#[test]
fn save_and_load_run() {
    let temp_dir = std::env::temp_dir().join("ms_results_smoke");
    let _ = fs::remove_dir_all(&temp_dir);

    let store = RunStore::new(temp_dir.clone()).unwrap();
    let m = manifest("run_abc", "no_load", "2026-10-18T12:00:00Z");
    let samples = vec![sample(0.0, 0.0), sample(1.0, 2.5)];

    assert!(!store.has_run("run_abc"));
    store.save_run(&m, &samples, &steps()).unwrap();
    assert!(store.has_run("run_abc"));

    assert_eq!(store.load_manifest("run_abc").unwrap(), m);
    assert_eq!(store.load_samples("run_abc").unwrap(), samples);
    assert_eq!(store.load_steps("run_abc").unwrap(), steps());

    store.delete_run("run_abc").unwrap();
    assert!(!store.has_run("run_abc"));
    assert!(matches!(
        store.load_manifest("run_abc").unwrap_err(),
        ResultsError::RunNotFound { .. }
    ));

    let _ = fs::remove_dir_all(&temp_dir);
}

#[test]
fn list_runs_filters_by_scenario_and_sorts() {
    let project_dir = std::env::temp_dir().join("ms_results_list");
    let _ = fs::remove_dir_all(&project_dir);
    fs::create_dir_all(&project_dir).unwrap();
    let project_path = project_dir.join("project.yaml");

    let store = RunStore::for_project(&project_path).unwrap();
    assert!(store.root_dir().ends_with(".motorsim/runs"));

    store
        .save_run(&manifest("r2", "no_load", "2026-10-18T12:05:00Z"), &[], &[])
        .unwrap();
    store
        .save_run(&manifest("r1", "no_load", "2026-10-18T12:00:00Z"), &[], &[])
        .unwrap();
    store
        .save_run(&manifest("r3", "sinusoidal_load", "2026-10-18T12:10:00Z"), &[], &[])
        .unwrap();

    let runs = store.list_runs("no_load").unwrap();
    let ids: Vec<&str> = runs.iter().map(|m| m.run_id.as_str()).collect();
    assert_eq!(ids, ["r1", "r2"]);
    assert!(store.list_runs("missing").unwrap().is_empty());

    let _ = fs::remove_dir_all(&project_dir);
}

#[test]
fn initial_step_record_omits_step_size() {
    let json = serde_json::to_string(&steps()[0]).unwrap();
    assert!(!json.contains("step_s"));
}

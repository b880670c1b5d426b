//! Run execution and caching service.

use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, warn};

use ms_project::schema::{ConstantsDef, Project, ScenarioDef};
use ms_results::{RunManifest, RunStore, SampleRecord, StepRecord};
use ms_sim::DriveRun;

use crate::error::AppResult;
use crate::progress::{IntegrationProgress, RunProgressEvent, RunStage};
use crate::project_service;
use crate::scenario_compile;

/// Options for running simulations.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub solver_version: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            solver_version: "0.1.0".to_string(),
        }
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub project_path: &'a Path,
    pub scenario_id: &'a str,
    pub options: RunOptions,
}

/// Concise timing summary for a run.
#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub compile_time_s: f64,
    pub solve_time_s: f64,
    pub save_time_s: f64,
    pub load_cache_time_s: f64,
    pub total_time_s: f64,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub loaded_from_cache: bool,
    pub timing: RunTimingSummary,
}

/// Per-scenario result of [`ensure_all_runs`].
#[derive(Debug)]
pub struct ScenarioOutcome {
    pub scenario_id: String,
    pub result: AppResult<RunResponse>,
}

/// A stored run with its series.
#[derive(Debug, Clone)]
pub struct LoadedRun {
    pub manifest: RunManifest,
    pub samples: Vec<SampleRecord>,
    pub steps: Vec<StepRecord>,
}

/// Optional sink for [`RunProgressEvent`]s.
pub type ProgressCb<'a> = Option<&'a mut dyn FnMut(RunProgressEvent)>;

fn emit_progress(
    progress_cb: &mut ProgressCb<'_>,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
    integration: Option<IntegrationProgress>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent {
            stage,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
            message,
            integration,
        });
    }
}

/// Execute or load a run based on request.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    ensure_run_with_progress(request, None)
}

/// Execute or load a run and stream progress events.
pub fn ensure_run_with_progress(
    request: &RunRequest,
    mut progress_cb: ProgressCb<'_>,
) -> AppResult<RunResponse> {
    let started = Instant::now();

    emit_progress(
        &mut progress_cb,
        RunStage::LoadingProject,
        started,
        Some("Loading project".to_string()),
        None,
    );

    let project = project_service::load_project(request.project_path)?;
    let scenario = project_service::get_scenario(&project, request.scenario_id)?;
    let store = RunStore::for_project(request.project_path)?;

    run_scenario(
        &store,
        &project.constants,
        scenario,
        &request.options,
        &mut progress_cb,
        started,
    )
}

/// Execute or load every scenario of a project, in parallel.
///
/// Scenarios are independent; one failing does not stop the others.
pub fn ensure_all_runs(
    project_path: &Path,
    options: &RunOptions,
) -> AppResult<Vec<ScenarioOutcome>> {
    let project: Project = project_service::load_project(project_path)?;
    let store = RunStore::for_project(project_path)?;

    let outcomes = project
        .scenarios
        .par_iter()
        .map(|scenario| ScenarioOutcome {
            scenario_id: scenario.id.clone(),
            result: run_scenario(
                &store,
                &project.constants,
                scenario,
                options,
                &mut None,
                Instant::now(),
            ),
        })
        .collect();

    Ok(outcomes)
}

fn run_scenario(
    store: &RunStore,
    constants: &ConstantsDef,
    scenario: &ScenarioDef,
    options: &RunOptions,
    progress_cb: &mut ProgressCb<'_>,
    started: Instant,
) -> AppResult<RunResponse> {
    let mut timing = RunTimingSummary::default();

    emit_progress(
        progress_cb,
        RunStage::CheckingCache,
        started,
        Some("Checking run cache".to_string()),
        None,
    );

    let run_id = ms_results::compute_run_id(constants, scenario, &options.solver_version);

    if options.use_cache && store.has_run(&run_id) {
        emit_progress(
            progress_cb,
            RunStage::LoadingCachedResult,
            started,
            Some("Loading cached run".to_string()),
            None,
        );

        let load_started = Instant::now();
        match store.load_manifest(&run_id) {
            Ok(manifest) => {
                timing.load_cache_time_s = load_started.elapsed().as_secs_f64();
                timing.total_time_s = started.elapsed().as_secs_f64();
                debug!(scenario = %scenario.id, run_id = %run_id, "loaded cached run");

                emit_progress(
                    progress_cb,
                    RunStage::Completed,
                    started,
                    Some("Loaded cached run".to_string()),
                    None,
                );

                return Ok(RunResponse {
                    run_id,
                    manifest,
                    loaded_from_cache: true,
                    timing,
                });
            }
            Err(e) => warn!(run_id = %run_id, error = %e, "cached run unreadable, re-running"),
        }
    }

    let manifest = execute_run(
        store,
        constants,
        scenario,
        &run_id,
        &options.solver_version,
        progress_cb,
        started,
        &mut timing,
    )
    .inspect_err(|e| warn!(scenario = %scenario.id, error = %e, "run failed"))?;

    timing.total_time_s = started.elapsed().as_secs_f64();

    emit_progress(
        progress_cb,
        RunStage::Completed,
        started,
        Some("Run completed".to_string()),
        None,
    );

    Ok(RunResponse {
        run_id,
        manifest,
        loaded_from_cache: false,
        timing,
    })
}

#[allow(clippy::too_many_arguments)]
fn execute_run(
    store: &RunStore,
    constants: &ConstantsDef,
    scenario: &ScenarioDef,
    run_id: &str,
    solver_version: &str,
    progress_cb: &mut ProgressCb<'_>,
    started: Instant,
    timing: &mut RunTimingSummary,
) -> AppResult<RunManifest> {
    emit_progress(
        progress_cb,
        RunStage::Compiling,
        started,
        Some("Compiling scenario".to_string()),
        None,
    );

    let compile_started = Instant::now();
    let rt = scenario_compile::compile_scenario(constants, scenario)?;
    timing.compile_time_s = compile_started.elapsed().as_secs_f64();

    emit_progress(
        progress_cb,
        RunStage::Integrating,
        started,
        Some("Integrating".to_string()),
        Some(IntegrationProgress {
            sim_time_s: rt.span.start,
            t_end_s: rt.span.end,
            ..IntegrationProgress::default()
        }),
    );

    let solve_started = Instant::now();
    let run = ms_sim::run_drive_with_progress(
        &rt.model,
        &rt.load,
        &rt.initial,
        rt.span,
        &rt.grid,
        &rt.options,
        Some(&mut |p: &ms_sim::SimProgress| {
            emit_progress(
                progress_cb,
                RunStage::Integrating,
                started,
                Some(format!(
                    "Step {} | t={:.4}/{:.4} s | rejected={}",
                    p.accepted, p.t, p.t_end, p.rejected
                )),
                Some(IntegrationProgress {
                    sim_time_s: p.t,
                    t_end_s: p.t_end,
                    fraction_complete: p.fraction_complete,
                    accepted_steps: p.accepted,
                    rejected_steps: p.rejected,
                    step_s: p.h,
                }),
            )
        }),
    )?;
    timing.solve_time_s = solve_started.elapsed().as_secs_f64();

    let stats = run.trajectory.stats;
    let manifest = RunManifest {
        run_id: run_id.to_string(),
        scenario_id: scenario.id.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        solver_version: solver_version.to_string(),
        method: rt.options.integrator.name().to_string(),
        atol: rt.options.atol,
        rtol: rt.options.rtol,
        t_start_s: rt.span.start,
        t_end_s: rt.span.end,
        accepted_steps: stats.accepted,
        rejected_steps: stats.rejected,
        rhs_evals: stats.rhs_evals,
    };

    emit_progress(
        progress_cb,
        RunStage::SavingResults,
        started,
        Some("Saving results".to_string()),
        None,
    );

    let save_started = Instant::now();
    store.save_run(&manifest, &sample_records(&run), &step_records(&run))?;
    timing.save_time_s = save_started.elapsed().as_secs_f64();

    debug!(
        scenario = %scenario.id,
        run_id = %run_id,
        accepted = stats.accepted,
        rejected = stats.rejected,
        "run saved"
    );

    Ok(manifest)
}

fn sample_records(run: &DriveRun) -> Vec<SampleRecord> {
    run.samples
        .iter()
        .map(|s| SampleRecord {
            time_s: s.time,
            current_a: s.i_l,
            omega_rad_s: s.omega,
            v1_v: s.v1,
            soc: s.soc,
            terminal_v: s.v_t,
        })
        .collect()
}

fn step_records(run: &DriveRun) -> Vec<StepRecord> {
    let t = &run.trajectory.t;
    t.iter()
        .zip(run.accepted_states())
        .enumerate()
        .map(|(i, (&time_s, state))| StepRecord {
            time_s,
            step_s: (i > 0).then(|| time_s - t[i - 1]),
            current_a: state.i_l,
            omega_rad_s: state.omega,
            v1_v: state.v1,
            soc: state.soc,
        })
        .collect()
}

/// List runs of a scenario, most recent first.
pub fn list_runs(project_path: &Path, scenario_id: &str) -> AppResult<Vec<RunManifest>> {
    let store = RunStore::for_project(project_path)?;

    let mut runs = store.list_runs(scenario_id)?;
    runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(runs)
}

/// Load a specific run.
pub fn load_run(project_path: &Path, run_id: &str) -> AppResult<LoadedRun> {
    let store = RunStore::for_project(project_path)?;

    Ok(LoadedRun {
        manifest: store.load_manifest(run_id)?,
        samples: store.load_samples(run_id)?,
        steps: store.load_steps(run_id)?,
    })
}

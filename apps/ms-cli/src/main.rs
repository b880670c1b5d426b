use clap::{Parser, Subcommand};
use ms_app::{
    AppResult, RunOptions, RunProgressEvent, RunRequest, RunStage, project_service, query,
    run_service,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

#[derive(Parser)]
#[command(name = "motorsim")]
#[command(about = "motorsim - battery-driven DC motor simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and values
    Validate {
        /// Path to the scenario file (YAML or JSON)
        project_path: PathBuf,
    },
    /// List scenarios in a project
    Scenarios {
        /// Path to the scenario file
        project_path: PathBuf,
    },
    /// Run one scenario
    Run {
        /// Path to the scenario file
        project_path: PathBuf,
        /// Scenario ID to simulate
        scenario_id: String,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// Run every scenario in parallel
    RunAll {
        /// Path to the scenario file
        project_path: PathBuf,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// List cached runs for a scenario
    Runs {
        /// Path to the scenario file
        project_path: PathBuf,
        /// Scenario ID to list runs for
        scenario_id: String,
    },
    /// Show details of a cached run
    ShowRun {
        /// Path to the scenario file
        project_path: PathBuf,
        /// Run ID to display
        run_id: String,
    },
    /// Export a sampled variable from a run as CSV
    ExportSeries {
        /// Path to the scenario file
        project_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Variable name (current_a, omega_rad_s, v1_v, soc, terminal_v)
        variable: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export accepted step sizes from a run as CSV
    StepSizes {
        /// Path to the scenario file
        project_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Scenarios { project_path } => cmd_scenarios(&project_path),
        Commands::Run {
            project_path,
            scenario_id,
            no_cache,
        } => cmd_run(&project_path, &scenario_id, !no_cache),
        Commands::RunAll {
            project_path,
            no_cache,
        } => cmd_run_all(&project_path, !no_cache),
        Commands::Runs {
            project_path,
            scenario_id,
        } => cmd_runs(&project_path, &scenario_id),
        Commands::ShowRun {
            project_path,
            run_id,
        } => cmd_show_run(&project_path, &run_id),
        Commands::ExportSeries {
            project_path,
            run_id,
            variable,
            output,
        } => cmd_export_series(&project_path, &run_id, &variable, output.as_deref()),
        Commands::StepSizes {
            project_path,
            run_id,
            output,
        } => cmd_step_sizes(&project_path, &run_id, output.as_deref()),
    }
}

fn run_options(use_cache: bool) -> RunOptions {
    RunOptions {
        use_cache,
        ..RunOptions::default()
    }
}

fn cmd_validate(project_path: &Path) -> AppResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = project_service::load_project(project_path)?;
    project_service::validate_project(&project)?;
    println!("✓ Project is valid");
    Ok(())
}

fn cmd_scenarios(project_path: &Path) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let scenarios = project_service::list_scenarios(&project);

    if scenarios.is_empty() {
        println!("No scenarios found in project");
    } else {
        println!("Scenarios in project:");
        for s in scenarios {
            println!(
                "  {} - {} (load: {}, t = {} .. {} s, {})",
                s.id, s.name, s.load, s.t_start_s, s.t_end_s, s.method
            );
        }
    }
    Ok(())
}

fn cmd_run(project_path: &Path, scenario_id: &str, use_cache: bool) -> AppResult<()> {
    println!("Running scenario: {}", scenario_id);

    let request = RunRequest {
        project_path,
        scenario_id,
        options: run_options(use_cache),
    };

    let mut last_emit = Instant::now();
    let mut last_fraction = -1.0f64;
    let response = run_service::ensure_run_with_progress(
        &request,
        Some(&mut |event: RunProgressEvent| {
            let fraction = event
                .integration
                .as_ref()
                .map(|p| p.fraction_complete)
                .unwrap_or(-1.0);
            let emit_now = (fraction >= 0.0 && (fraction - last_fraction).abs() >= 0.005)
                || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                if fraction >= 0.0 {
                    last_fraction = fraction;
                }
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Simulation completed: {}", response.run_id);
    }

    print_timing_summary(&response.timing);
    print_run_summary(project_path, &response.run_id)
}

fn cmd_run_all(project_path: &Path, use_cache: bool) -> AppResult<()> {
    let started = Instant::now();
    let outcomes = run_service::ensure_all_runs(project_path, &run_options(use_cache))?;

    let mut failures = 0usize;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(response) => println!(
                "✓ {}: {} ({}, {} accepted / {} rejected steps)",
                outcome.scenario_id,
                response.run_id,
                if response.loaded_from_cache {
                    "cached"
                } else {
                    "computed"
                },
                response.manifest.accepted_steps,
                response.manifest.rejected_steps
            ),
            Err(e) => {
                failures += 1;
                println!("✗ {}: {}", outcome.scenario_id, e);
            }
        }
    }
    info!(
        scenarios = outcomes.len(),
        failures,
        elapsed_s = started.elapsed().as_secs_f64(),
        "run-all finished"
    );

    if failures > 0 {
        return Err(ms_app::AppError::Simulation(format!(
            "{} of {} scenarios failed",
            failures,
            outcomes.len()
        )));
    }
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    match (event.stage, &event.integration) {
        (RunStage::Integrating, Some(p)) => {
            let width = 28usize;
            let filled = ((p.fraction_complete * width as f64).round() as usize).min(width);
            let bar = format!(
                "{}{}",
                "#".repeat(filled),
                "-".repeat(width.saturating_sub(filled))
            );
            print!(
                "\r[{}] {:>6.2}%  t={:.3}/{:.3}s  h={:.3e}  accepted={}  rejected={}  elapsed={:.1}s",
                bar,
                p.fraction_complete * 100.0,
                p.sim_time_s,
                p.t_end_s,
                p.step_s,
                p.accepted_steps,
                p.rejected_steps,
                event.elapsed_wall_s
            );
            let _ = io::stdout().flush();
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {}", msg));
            }
            print!("{}", line);
            let _ = io::stdout().flush();
        }
    }
}

fn print_timing_summary(timing: &ms_app::RunTimingSummary) {
    let total = timing.total_time_s.max(1.0e-12);
    let compile_pct = 100.0 * timing.compile_time_s / total;
    let solve_pct = 100.0 * timing.solve_time_s / total;
    let save_pct = 100.0 * timing.save_time_s / total;

    println!("\nTiming summary:");
    println!(
        "  Compile: {:.3}s ({:.1}%)",
        timing.compile_time_s, compile_pct
    );
    println!("  Solve:   {:.3}s ({:.1}%)", timing.solve_time_s, solve_pct);
    println!("  Save:    {:.3}s ({:.1}%)", timing.save_time_s, save_pct);
    if timing.load_cache_time_s > 0.0 {
        println!("  Cache load: {:.3}s", timing.load_cache_time_s);
    }
    println!("  Total:   {:.3}s", timing.total_time_s);
}

fn print_run_summary(project_path: &Path, run_id: &str) -> AppResult<()> {
    let run = run_service::load_run(project_path, run_id)?;
    let summary = query::get_run_summary(&run.manifest, &run.samples, &run.steps)?;

    println!("\nRun Summary:");
    println!("  Scenario: {}", run.manifest.scenario_id);
    println!(
        "  Method: {} (atol {:e}, rtol {:e})",
        run.manifest.method, run.manifest.atol, run.manifest.rtol
    );
    println!(
        "  Time range: {:.3} - {:.3} s",
        summary.time_range.0, summary.time_range.1
    );
    println!("  Samples: {}", summary.sample_count);
    println!(
        "  Steps: {} accepted, {} rejected, {} rhs evaluations",
        summary.accepted_steps, summary.rejected_steps, summary.rhs_evals
    );
    println!(
        "  Step size: {:.3e} .. {:.3e} s",
        summary.min_step_s, summary.max_step_s
    );
    println!("  Final speed: {:.4} rad/s", summary.final_omega_rad_s);
    println!("  Final state of charge: {:.6}", summary.final_soc);
    Ok(())
}

fn cmd_runs(project_path: &Path, scenario_id: &str) -> AppResult<()> {
    let runs = run_service::list_runs(project_path, scenario_id)?;

    if runs.is_empty() {
        println!("No cached runs found for scenario: {}", scenario_id);
    } else {
        println!("Cached runs for scenario '{}':", scenario_id);
        for manifest in runs {
            println!("  {} ({})", manifest.run_id, manifest.timestamp);
        }
    }
    Ok(())
}

fn cmd_show_run(project_path: &Path, run_id: &str) -> AppResult<()> {
    println!("Loading run: {}", run_id);
    print_run_summary(project_path, run_id)?;

    println!("\nVariables:");
    for name in query::VARIABLES {
        println!("  {}", name);
    }
    Ok(())
}

fn write_csv(header: &str, series: &[(f64, f64)], output: Option<&Path>) -> AppResult<()> {
    let mut csv = format!("{}\n", header);
    for (t, val) in series {
        csv.push_str(&format!("{},{}\n", t, val));
    }

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!(
            "✓ Exported {} data points to {}",
            series.len(),
            path.display()
        );
    } else {
        print!("{}", csv);
    }
    Ok(())
}

fn cmd_export_series(
    project_path: &Path,
    run_id: &str,
    variable: &str,
    output: Option<&Path>,
) -> AppResult<()> {
    let run = run_service::load_run(project_path, run_id)?;
    let series = query::extract_series(&run.samples, variable)?;
    write_csv("time_s,value", &series, output)
}

fn cmd_step_sizes(project_path: &Path, run_id: &str, output: Option<&Path>) -> AppResult<()> {
    let run = run_service::load_run(project_path, run_id)?;
    let series = query::step_size_series(&run.steps);
    write_csv("time_s,step_s", &series, output)
}

use clap::{Parser, Subcommand};
use msd_app::{
    AppResult, RunOptions, RunProgressEvent, RunRequest, RunTimingSummary, output, query,
    run_service, scenario_service, sweep_service,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "msd-cli")]
#[command(about = "msdflow CLI - mass-spring-damper simulation tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a scenario file
    Validate {
        /// Path to the scenario YAML/JSON file
        scenario_path: PathBuf,
    },
    /// Run a scenario (any sweep section is ignored)
    Run {
        scenario_path: PathBuf,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
        /// Write the trajectory as CSV (overrides the scenario's output.csv)
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Write a position plot, .svg or .png (overrides output.plot)
        #[arg(long)]
        plot: Option<PathBuf>,
    },
    /// Run every point of the scenario's parameter sweep
    Sweep {
        scenario_path: PathBuf,
        #[arg(long)]
        no_cache: bool,
        /// Overlay plot of all points (overrides output.plot)
        #[arg(long)]
        plot: Option<PathBuf>,
    },
    /// Write a built-in scenario to a file
    Builtin {
        /// One of: baseline, bellow, momentum, stiffening
        name: String,
        output: PathBuf,
    },
    /// List cached runs for a scenario
    Runs { scenario_path: PathBuf },
    /// Export a cached run's trajectory as CSV
    ExportSeries {
        scenario_path: PathBuf,
        run_id: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Run {
            scenario_path,
            no_cache,
            csv,
            plot,
        } => cmd_run(&scenario_path, !no_cache, csv.as_deref(), plot.as_deref()),
        Commands::Sweep {
            scenario_path,
            no_cache,
            plot,
        } => cmd_sweep(&scenario_path, !no_cache, plot.as_deref()),
        Commands::Builtin { name, output } => cmd_builtin(&name, &output),
        Commands::Runs { scenario_path } => cmd_runs(&scenario_path),
        Commands::ExportSeries {
            scenario_path,
            run_id,
            output,
        } => cmd_export_series(&scenario_path, &run_id, output.as_deref()),
    }
}

fn cmd_validate(scenario_path: &Path) -> AppResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = scenario_service::load_scenario(scenario_path)?;
    let summary = scenario_service::summarize_scenario(&scenario);

    println!("✓ Scenario '{}' is valid", summary.name);
    if let Some(description) = &summary.description {
        println!("  {}", description);
    }
    println!(
        "  Model: {}{}",
        if summary.momentum { "momentum-based MSD" } else { "MSD" },
        if summary.mass_guard { " (mass guard on)" } else { "" }
    );
    println!("  Span: {} - {} s", summary.t0, summary.t_end);
    println!("  Integrator: {:?}", summary.method);
    if let Some((parameter, points)) = summary.sweep {
        println!("  Sweep: {:?} over {} points", parameter, points);
    }
    Ok(())
}

fn cmd_run(
    scenario_path: &Path,
    use_cache: bool,
    csv: Option<&Path>,
    plot: Option<&Path>,
) -> AppResult<()> {
    let scenario = scenario_service::load_scenario(scenario_path)?;
    println!("Running scenario: {}", scenario.name);

    let request = RunRequest {
        scenario_path,
        options: RunOptions {
            use_cache,
            ..RunOptions::default()
        },
    };

    let response = run_service::ensure_run_with_progress(
        &request,
        Some(&mut |event| render_cli_progress(&event)),
    )?;
    clear_progress_line();

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Simulation completed: {}", response.run_id);
    }

    let stats = &response.manifest.stats;
    if !stats.success {
        println!("⚠ Run stopped early ({:?}): {}", stats.status, stats.message);
    }
    print_timing_summary(&response.timing);
    println!(
        "  Steps: {} accepted, {} rejected, {} RHS evaluations",
        stats.steps, stats.rejected, stats.rhs_evals
    );

    let summary = query::get_run_summary(&response.records)?;
    println!("  Time points: {}", summary.record_count);
    println!(
        "  x range: {:.6} .. {:.6} m",
        summary.x_range.0, summary.x_range.1
    );
    println!(
        "  Final state: x = {:.6} m, v = {:.6} m/s",
        summary.final_x, summary.final_v
    );

    let outputs = scenario.output.clone().unwrap_or_default();
    if let Some(path) = output_path(scenario_path, csv, outputs.csv.as_deref()) {
        output::write_csv(&path, &response.records)?;
        println!("✓ Wrote CSV: {}", path.display());
    }

    if let Some(path) = output_path(scenario_path, plot, outputs.plot.as_deref()) {
        let series = query::position_series(&response.records, None);
        output::write_plot(&path, &[series], outputs.title.as_deref())?;
        println!("✓ Wrote plot: {}", path.display());
    }

    Ok(())
}

fn cmd_sweep(scenario_path: &Path, use_cache: bool, plot: Option<&Path>) -> AppResult<()> {
    let scenario = scenario_service::load_scenario(scenario_path)?;
    println!("Running sweep for scenario: {}", scenario.name);

    let options = RunOptions {
        use_cache,
        ..RunOptions::default()
    };
    let response = sweep_service::run_sweep_scenario(scenario_path, &options)?;

    println!("✓ Sweep over {:?} completed", response.parameter);
    for point in &response.points {
        let stats = &point.manifest.stats;
        println!(
            "  {:<12} {}  {:?}{}",
            point.label,
            point.run_id,
            stats.status,
            if point.loaded_from_cache { " (cached)" } else { "" }
        );
    }
    println!("  Total: {:.3}s", response.total_time_s);

    let outputs = scenario.output.clone().unwrap_or_default();
    if let Some(path) = output_path(scenario_path, plot, outputs.plot.as_deref()) {
        let series: Vec<_> = response
            .points
            .iter()
            .map(|p| query::position_series(&p.records, Some(p.label.clone())))
            .collect();
        output::write_plot(&path, &series, outputs.title.as_deref())?;
        println!("✓ Wrote plot: {}", path.display());
    }

    Ok(())
}

/// Command-line paths win over the scenario's `output` section.
fn output_path(scenario_path: &Path, cli: Option<&Path>, scenario: Option<&str>) -> Option<PathBuf> {
    cli.map(Path::to_path_buf)
        .or_else(|| scenario.map(|p| output::resolve_output_path(scenario_path, p)))
}

fn cmd_builtin(name: &str, output: &Path) -> AppResult<()> {
    let scenario = scenario_service::write_builtin(name, output)?;
    println!(
        "✓ Wrote built-in scenario '{}' to {}",
        scenario.name,
        output.display()
    );
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(80));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
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

fn print_timing_summary(timing: &RunTimingSummary) {
    let total = timing.total_time_s.max(1.0e-12);
    let build_pct = 100.0 * timing.build_time_s / total;
    let solve_pct = 100.0 * timing.solve_time_s / total;
    let save_pct = 100.0 * timing.save_time_s / total;

    println!("\nTiming summary:");
    if timing.load_cache_time_s > 0.0 {
        println!("  Cache load: {:.3}s", timing.load_cache_time_s);
    } else {
        println!("  Build:   {:.3}s ({:.1}%)", timing.build_time_s, build_pct);
        println!("  Solve:   {:.3}s ({:.1}%)", timing.solve_time_s, solve_pct);
        println!("  Save:    {:.3}s ({:.1}%)", timing.save_time_s, save_pct);
    }
    println!("  Total:   {:.3}s", timing.total_time_s);
}

fn cmd_runs(scenario_path: &Path) -> AppResult<()> {
    let runs = run_service::list_runs(scenario_path)?;

    if runs.is_empty() {
        println!("No cached runs found for: {}", scenario_path.display());
    } else {
        println!("Cached runs for '{}':", runs[0].scenario_name);
        for manifest in runs {
            println!(
                "  {} ({}, {:?})",
                manifest.run_id, manifest.timestamp, manifest.run_type
            );
        }
    }
    Ok(())
}

fn cmd_export_series(scenario_path: &Path, run_id: &str, output: Option<&Path>) -> AppResult<()> {
    if let Some(path) = output {
        let rows = run_service::export_run_csv(scenario_path, run_id, path)?;
        println!("✓ Exported {} data points to {}", rows, path.display());
    } else {
        let (_manifest, records) = run_service::load_run(scenario_path, run_id)?;
        print!("{}", msd_results::write_csv(&records));
    }
    Ok(())
}

use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use s2f_app::{
    AppError, AppResult, ArtifactState, ClientSettings, HttpBackend, RunEvent, RunOrchestrator,
    RunPhase,
};
use s2f_core::{FullConfig, RunHandle, RunOptions, RunStatus};
use s2f_results::{BATT_KWH, PV_KW, PivotMatrix, SweepArtifact, SweepPivot, TimeseriesArtifact};

#[derive(Parser)]
#[command(name = "s2f")]
#[command(about = "sun2flops CLI - run solar-to-FLOPs simulations on a sun2flops service", long_about = None)]
struct Cli {
    /// Client settings YAML (base URL, timeouts, polling)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
    /// Service base URL, overriding the settings file
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the service is up
    Health,
    /// Fetch the service's default configuration
    Defaults {
        /// Write to a YAML or JSON file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Submit a run and follow it to completion
    #[command(subcommand)]
    Run(RunCommands),
    /// Download a stored artifact of a finished run
    Download {
        run_id: String,
        /// One of timeseries.csv, sweep.csv, metrics.json, config.json
        artifact: String,
        /// Output file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ConfigArgs {
    /// Simulation config file (YAML or JSON); built-in defaults otherwise
    #[arg(long)]
    config: Option<PathBuf>,
    /// Weather year to simulate
    #[arg(long)]
    year: Option<i32>,
    /// Simulate every configured weather year
    #[arg(long)]
    all_years: bool,
}

#[derive(Subcommand)]
enum RunCommands {
    /// Simulate one system configuration
    Single {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Sweep PV size against battery size
    Sweep {
        #[command(flatten)]
        config: ConfigArgs,
        /// PV sizes in kW, comma separated
        #[arg(long, value_delimiter = ',')]
        pv_kw: Vec<f64>,
        /// Battery sizes in kWh, comma separated
        #[arg(long, value_delimiter = ',')]
        batt_kwh: Vec<f64>,
        /// Sweep metric to print as a heatmap (repeatable)
        #[arg(long = "metric", default_values = ["utilization", "total_flops"])]
        metrics: Vec<String>,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.settings.as_deref(), cli.base_url)?;

    match cli.command {
        Commands::Health => cmd_health(&settings),
        Commands::Defaults { output } => cmd_defaults(&settings, output.as_deref()),
        Commands::Run(run_cmd) => match run_cmd {
            RunCommands::Single { config } => cmd_run_single(&settings, &config),
            RunCommands::Sweep {
                config,
                pv_kw,
                batt_kwh,
                metrics,
            } => cmd_run_sweep(&settings, &config, pv_kw, batt_kwh, &metrics),
        },
        Commands::Download {
            run_id,
            artifact,
            output,
        } => cmd_download(&settings, &run_id, &artifact, output.as_deref()),
    }
}

fn load_settings(path: Option<&Path>, base_url: Option<String>) -> AppResult<ClientSettings> {
    let mut settings = match path {
        Some(path) => ClientSettings::load(path)?,
        None => ClientSettings::default(),
    };
    if let Some(url) = base_url {
        settings.base_url = url;
    }
    Ok(settings)
}

fn cmd_health(settings: &ClientSettings) -> AppResult<()> {
    let backend = HttpBackend::from_settings(settings)?;
    let health = backend.health()?;
    println!("✓ {} is up ({})", backend.base_url(), health.status);
    if health.nsrdb_configured {
        println!("  NSRDB weather access: configured");
    } else {
        println!("  NSRDB weather access: NOT configured (runs will fail to fetch weather)");
    }
    Ok(())
}

fn cmd_defaults(settings: &ClientSettings, output: Option<&Path>) -> AppResult<()> {
    let backend = HttpBackend::from_settings(settings)?;
    let config = backend.defaults()?;
    match output {
        Some(path) => {
            s2f_core::save_config(path, &config)?;
            println!("✓ Defaults written to {}", path.display());
        }
        None => {
            let json = serde_json::to_string_pretty(&config)
                .map_err(|e| AppError::Decode(e.to_string()))?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn cmd_download(
    settings: &ClientSettings,
    run_id: &str,
    artifact: &str,
    output: Option<&Path>,
) -> AppResult<()> {
    let backend = HttpBackend::from_settings(settings)?;
    let bytes = backend.download(&RunHandle::new(run_id), artifact)?;
    match output {
        Some(path) => {
            std::fs::write(path, &bytes)?;
            println!("✓ {} bytes written to {}", bytes.len(), path.display());
        }
        None => io::stdout().write_all(&bytes)?,
    }
    Ok(())
}

fn load_run_config(args: &ConfigArgs) -> AppResult<FullConfig> {
    match &args.config {
        Some(path) => Ok(s2f_core::load_config(path)?),
        None => Ok(FullConfig::default()),
    }
}

fn run_options(args: &ConfigArgs) -> RunOptions {
    let mut options = RunOptions::default();
    if args.year.is_some() {
        options.single_year = args.year;
    }
    options.use_all_years = args.all_years;
    options
}

fn cmd_run_single(settings: &ClientSettings, args: &ConfigArgs) -> AppResult<()> {
    let config = load_run_config(args)?;
    let options = run_options(args);

    let mut orch = RunOrchestrator::with_backend(
        HttpBackend::from_settings(settings)?,
        settings.orchestrator(),
    );
    orch.run_single(config, options);
    follow(&mut orch)?;

    if let Some(status) = orch.status() {
        print_metrics(status);
    }
    if let Some(timeseries) = orch.timeseries() {
        print_timeseries_summary(timeseries);
    }
    Ok(())
}

fn cmd_run_sweep(
    settings: &ClientSettings,
    args: &ConfigArgs,
    pv_kw: Vec<f64>,
    batt_kwh: Vec<f64>,
    metrics: &[String],
) -> AppResult<()> {
    let config = load_run_config(args)?;
    let mut options = run_options(args);
    if !pv_kw.is_empty() {
        options.pv_kw_list = pv_kw;
    }
    if !batt_kwh.is_empty() {
        options.batt_kwh_list = batt_kwh;
    }
    println!(
        "Sweeping {} PV sizes x {} battery sizes ({} simulations)",
        options.pv_kw_list.len(),
        options.batt_kwh_list.len(),
        options.sweep_size()
    );

    let mut orch = RunOrchestrator::with_backend(
        HttpBackend::from_settings(settings)?,
        settings.orchestrator(),
    );
    orch.run_sweep(config, options);
    follow(&mut orch)?;

    if let Some(status) = orch.status() {
        print_metrics(status);
    }
    match orch.sweep_state() {
        ArtifactState::Ready(sweep) => print_heatmaps(sweep, metrics),
        ArtifactState::Absent => println!("\nService returned no sweep for this run"),
        _ => {}
    }
    Ok(())
}

/// Drive the orchestrator until the run and its fetches are finished,
/// printing progress as it goes.
fn follow(orch: &mut RunOrchestrator) -> AppResult<()> {
    let wait = orch.config().poll_interval.max(Duration::from_millis(50));
    let mut reporter = Reporter::default();

    loop {
        orch.tick(Instant::now());
        for event in orch.take_events() {
            reporter.render(&event);
        }
        if orch.is_settled() {
            break;
        }
        orch.await_reply(wait);
    }
    reporter.finish();

    if orch.phase() == RunPhase::Failed {
        return Err(AppError::Backend {
            message: orch.error().unwrap_or("run failed").to_string(),
        });
    }
    if let Some(error) = orch.error() {
        eprintln!("warning: {}", error);
    }
    Ok(())
}

#[derive(Default)]
struct Reporter {
    last_status: Option<RunStatus>,
    on_progress_line: bool,
}

impl Reporter {
    fn render(&mut self, event: &RunEvent) {
        match event {
            RunEvent::Status(status) => {
                if self.last_status.as_ref() == Some(status) {
                    return;
                }
                let width = 28usize;
                let filled = ((status.progress.min(100) as usize * width) / 100).min(width);
                print!(
                    "\r{} [{}{}] {:>3}%  {:<8} {}",
                    timestamp(),
                    "#".repeat(filled),
                    "-".repeat(width - filled),
                    status.progress,
                    status.status.as_str(),
                    status.message
                );
                let _ = io::stdout().flush();
                self.on_progress_line = true;
                self.last_status = Some(status.clone());
            }
            other => {
                self.finish();
                match other {
                    RunEvent::Submitted { mode, fingerprint } => println!(
                        "{} Submitting {} run (config {})",
                        timestamp(),
                        mode,
                        fingerprint.get(..12).unwrap_or(fingerprint)
                    ),
                    RunEvent::Created { handle } => {
                        println!("{} Run created: {}", timestamp(), handle)
                    }
                    RunEvent::TimeseriesReady { rows, columns } => println!(
                        "{} Time series fetched: {} rows x {} columns",
                        timestamp(),
                        rows,
                        columns
                    ),
                    RunEvent::SweepReady { rows } => {
                        println!("{} Sweep fetched: {} combinations", timestamp(), rows)
                    }
                    RunEvent::SweepAbsent => {}
                    RunEvent::ArtifactFailed { artifact, message } => println!(
                        "{} ✗ Failed to fetch {}: {}",
                        timestamp(),
                        artifact,
                        message
                    ),
                    RunEvent::Failed { message } => {
                        println!("{} ✗ Run failed: {}", timestamp(), message)
                    }
                    RunEvent::Reset => println!("{} Reset", timestamp()),
                    RunEvent::Status(_) => {}
                }
            }
        }
    }

    fn finish(&mut self) {
        if self.on_progress_line {
            println!();
            self.on_progress_line = false;
        }
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

fn print_metrics(status: &RunStatus) {
    let Some(metrics) = &status.metrics else {
        return;
    };
    if metrics.is_empty() {
        return;
    }
    println!("\nMetrics:");
    let width = metrics.keys().map(String::len).max().unwrap_or(0);
    for (name, value) in metrics {
        println!("  {:<width$}  {}", name, format_value(*value), width = width);
    }
}

fn format_value(value: f64) -> String {
    if value != 0.0 && (value.abs() >= 1e6 || value.abs() < 1e-3) {
        format!("{:.4e}", value)
    } else {
        format!("{:.4}", value)
    }
}

fn print_timeseries_summary(timeseries: &TimeseriesArtifact) {
    let summary = timeseries.summary();
    println!("\nTime series:");
    println!("  Rows:    {}", summary.row_count);
    println!("  Columns: {}", summary.column_count);
    if let (Some(first), Some(last)) = (&summary.first_label, &summary.last_label) {
        println!("  Range:   {} .. {}", first, last);
    }

    for column in timeseries.columns() {
        if let Ok(Some(stats)) = timeseries.column_stats(column) {
            println!(
                "  {:<24} min {:>12}  mean {:>12}  max {:>12}",
                column,
                format_value(stats.min),
                format_value(stats.mean),
                format_value(stats.max)
            );
        }
    }
}

/// Display unit and scale for known sweep metrics.
fn display_unit(metric: &str) -> (f64, &'static str) {
    match metric {
        "utilization" => (100.0, "%"),
        "total_flops" => (1e-15, "PFLOP"),
        _ => (1.0, ""),
    }
}

fn print_heatmaps(sweep: &SweepArtifact, metrics: &[String]) {
    let available = sweep.metric_names(PV_KW, BATT_KWH);
    let pivot = SweepPivot::default();

    for metric in metrics {
        if !available.contains(&metric.as_str()) {
            tracing::warn!(%metric, "metric not present in sweep");
            println!("\n{}: not present in sweep (available: {})", metric, available.join(", "));
            continue;
        }
        let (scale, unit) = display_unit(metric);
        let matrix = pivot.matrix(&sweep.rows, metric).scaled(scale);
        print_heatmap(&matrix, unit);
    }
}

fn print_heatmap(matrix: &PivotMatrix, unit: &str) {
    if unit.is_empty() {
        println!("\n{}", matrix.metric);
    } else {
        println!("\n{} ({})", matrix.metric, unit);
    }
    if matrix.is_empty() {
        println!("  (no data)");
        return;
    }

    let mut header = format!("  {:>10} |", "kWh \\ kW");
    for x in &matrix.x {
        header.push_str(&format!(" {:>10}", x));
    }
    println!("{}", header);
    println!("  {}", "-".repeat(header.len() - 2));

    for (y, row) in matrix.y.iter().zip(&matrix.values) {
        let mut line = format!("  {:>10} |", y);
        for value in row {
            line.push_str(&format!(" {:>10.2}", value));
        }
        println!("{}", line);
    }

    if let Some((x, y, value)) = matrix.max_cell() {
        println!(
            "  best: {} = {} kW, {} = {} kWh -> {:.2}",
            PV_KW, x, BATT_KWH, y, value
        );
    }
}

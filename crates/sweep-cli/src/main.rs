use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sweep_core::SweepError;
use sweep_exp::{
    drive_experiment, write_report, CommandBuilder, DriveOptions, ExperimentLoader, Harness,
    ProcessInvoker, SweepReport, DEFAULT_EXPERIMENT_DIR, DEFAULT_PROGRAM,
};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Exit status when the sweep completed but some combinations failed and
/// `--fail-on-error` was given.
const EXIT_COMBINATION_FAILED: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "lacam-sweep",
    about = "Run lacam experiments with different parameters."
)]
struct Cli {
    /// Experiment name to run.
    experiment: String,
    /// Perform a dry run without executing commands.
    #[arg(long)]
    dry_run: bool,
    /// Directory holding `<experiment>.yaml` documents.
    #[arg(long, default_value = DEFAULT_EXPERIMENT_DIR)]
    experiment_dir: PathBuf,
    /// External program invoked for every combination.
    #[arg(long, default_value = DEFAULT_PROGRAM)]
    program: String,
    /// Working directory for the external program.
    #[arg(long)]
    workdir: Option<PathBuf>,
    /// Run only the combination at this zero-based index.
    #[arg(long)]
    only: Option<usize>,
    /// Write a JSON report of every attempted combination.
    #[arg(long)]
    report: Option<PathBuf>,
    /// Exit with a non-zero status when any combination failed.
    #[arg(long)]
    fail_on_error: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_level(false)
        .with_ansi(std::io::stdout().is_terminal())
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(report) if cli.fail_on_error && report.has_failures() => {
            ExitCode::from(EXIT_COMBINATION_FAILED)
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<SweepReport, SweepError> {
    let loader = ExperimentLoader::new(&cli.experiment_dir);
    let mut invoker = ProcessInvoker::new();
    if let Some(dir) = &cli.workdir {
        invoker = invoker.with_current_dir(dir);
    }
    let mut harness = Harness::new(CommandBuilder::new(&cli.program), invoker, cli.dry_run);
    let options = DriveOptions {
        only: cli.only,
        record_jobs: cli.report.is_some(),
    };
    let report = drive_experiment(&loader, &cli.experiment, &mut harness, &options)?;
    if let Some(path) = &cli.report {
        write_report(path, &report)?;
        info!("Wrote sweep report to {}", path.display());
    }
    Ok(report)
}

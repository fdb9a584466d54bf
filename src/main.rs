use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use schedcheck::cli::{self, CliConfig};
use schedcheck::{analysis, config, curve, log_summary, report};

fn main() -> ExitCode {
    let cli = cli::parse_args();
    let mut all_schedulable = true;
    let mut failed = false;

    // Each file is an independent load -> analyze -> report run.
    for path in &cli.files {
        match run_pipeline(path, &cli) {
            Ok(schedulable) => all_schedulable &= schedulable,
            Err(err) => {
                eprintln!("error: {}: {err}", path.display());
                failed = true;
            }
        }
    }

    if failed || !all_schedulable {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

#[derive(Debug)]
enum PipelineError {
    Config(config::ConfigError),
    Io(io::Error),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => {
                write!(f, "{err}")?;
                // thiserror sources carry the YAML/IO detail.
                if let Some(source) = std::error::Error::source(err) {
                    write!(f, ": {source}")?;
                }
                Ok(())
            }
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl From<config::ConfigError> for PipelineError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<io::Error> for PipelineError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Load, analyze and report one task-definition file. Returns whether
/// the set was schedulable.
fn run_pipeline(path: &Path, cli: &CliConfig) -> Result<bool, PipelineError> {
    log_summary!(cli.verbosity, "loading {}", path.display());
    let set = config::load_path(path)?;
    log_summary!(
        cli.verbosity,
        "loaded {:?}: {} tasks, {} mutexes",
        set.name(),
        set.tasks().len(),
        set.mutexes().len()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report::write_banner(&set, &mut out)?;
    report::write_report(&set, &mut out)?;

    let verdict = analysis::check_task_set(&set, cli.verbosity);
    report::write_verdict(&set, &verdict, &mut out)?;
    out.flush()?;

    if cli.curves {
        let saved = curve::save_curves(&set, cli.curve_duration)?;
        log_summary!(cli.verbosity, "saved {}", saved.display());
    }

    log_summary!(
        cli.verbosity,
        "{:?}: {}",
        set.name(),
        if verdict.schedulable() {
            "schedulable"
        } else {
            "NOT schedulable"
        }
    );
    Ok(verdict.schedulable())
}

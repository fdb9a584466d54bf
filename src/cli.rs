//! Command-line parser for the analyzer binary.
//!
//! Hand-rolled (no clap dependency) to keep the binary small.
//!
//! # Grammar
//!
//! ```text
//! schedcheck [OPTIONS] <taskdef.yml>...
//! schedcheck --help | -h
//! ```
//!
//! Every given file is loaded, analyzed and reported independently, in
//! order; the runs share no state.

use std::env;
use std::path::PathBuf;
use std::process;

/// Options parsed from the command line, passed explicitly through the
/// pipeline (there is no global argument state).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Task-definition files to analyze, in order.
    pub files: Vec<PathBuf>,
    /// Export time-demand curve samples as CSV per task set.
    pub curves: bool,
    /// Curve horizon override; defaults to the hyperperiod.
    pub curve_duration: Option<u64>,
    /// Verbosity level for stderr diagnostics.
    pub verbosity: u8,
}

/// A parse that did not produce a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    /// `--help`/`-h` was requested.
    Help,
    /// Invalid usage, with a diagnostic for stderr.
    Invalid(String),
}

/// Parse `std::env::args()` into a [`CliConfig`].
///
/// Prints usage and exits with code 0 on `--help`, code 2 on invalid
/// arguments.
pub fn parse_args() -> CliConfig {
    let mut args = env::args();
    let exe = args.next().unwrap_or_else(|| "schedcheck".to_string());
    match parse_from(args) {
        Ok(config) => config,
        Err(CliError::Help) => {
            print_usage(&exe);
            process::exit(0);
        }
        Err(CliError::Invalid(message)) => {
            eprintln!("error: {message}");
            eprintln!();
            print_usage(&exe);
            process::exit(2);
        }
    }
}

/// Parse an argument list (without the executable name).
pub fn parse_from<I>(args: I) -> Result<CliConfig, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut files = Vec::new();
    let mut curves = false;
    let mut curve_duration = None;
    let mut verbosity: u8 = 0;

    for arg in args {
        match arg.as_str() {
            "-h" | "--help" => return Err(CliError::Help),
            "--curves" => {
                curves = true;
                continue;
            }
            "-v" => {
                verbosity = verbosity.saturating_add(1);
                continue;
            }
            "-vv" => {
                verbosity = verbosity.saturating_add(2);
                continue;
            }
            "-vvv" => {
                verbosity = verbosity.saturating_add(3);
                continue;
            }
            _ => {}
        }
        if let Some(rest) = arg.strip_prefix("--curve-duration=") {
            let n: u64 = rest
                .parse()
                .map_err(|_| CliError::Invalid(format!("--curve-duration: invalid value '{rest}'")))?;
            if n == 0 {
                return Err(CliError::Invalid("--curve-duration must be >= 1".to_string()));
            }
            curve_duration = Some(n);
            continue;
        }
        if arg.starts_with('-') {
            return Err(CliError::Invalid(format!("unknown flag '{arg}'")));
        }
        files.push(PathBuf::from(arg));
    }

    if files.is_empty() {
        return Err(CliError::Invalid(
            "expected at least one task-definition file".to_string(),
        ));
    }

    Ok(CliConfig {
        files,
        curves,
        curve_duration,
        verbosity,
    })
}

fn print_usage(exe: &str) {
    eprintln!("Usage: {exe} [OPTIONS] <taskdef.yml>...");
    eprintln!();
    eprintln!("Check whether each task set in the given YAML task-definition files");
    eprintln!("can meet all deadlines under fixed-priority preemptive scheduling.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --curves              export demandcurve-<set>.csv per task set");
    eprintln!("  --curve-duration=N    curve horizon (default: LCM of all periods)");
    eprintln!("  -v, -vv, -vvv         increase stderr verbosity");
    eprintln!("  -h, --help            show this help");
}

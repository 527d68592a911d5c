use clap::Parser;
use std::path::PathBuf;
use tracing::warn;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    name = "runcase",
    version,
    about = "Stage, compile and run one viscoelastic pinch-off simulation case.",
    help_template = HELP_TEMPLATE,
    after_help = "Exit status is 0 on success, 1 on a usage or pre-flight error, and otherwise the engine's own exit code."
)]
pub struct Cli {
    /// Parameter file for the case. Relative paths are resolved against the project root.
    #[arg(value_name = "PARAMS_FILE")]
    pub params_file: Option<PathBuf>,

    /// Engine source file (".c" is appended when missing).
    #[arg(long, value_name = "FILE")]
    pub exec: Option<String>,

    /// Number of engine threads (positive integer).
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub threads: Option<String>,

    /// Deprecated alias for --threads.
    #[arg(
        long = "CPUs",
        alias = "cpus",
        value_name = "N",
        hide = true,
        allow_negative_numbers = true
    )]
    pub cpus: Option<String>,

    /// Deprecated and ignored.
    #[arg(long, hide = true)]
    pub mpi: bool,

    /// Project root containing `simulationCases/`. Takes the place of the run script's own
    /// directory: relative inputs resolve here, and the default is the current directory,
    /// never the location of the `runcase` binary.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// The requested thread count, honoring the deprecated `--CPUs` spelling.
    ///
    /// `--threads` wins when both are given. Deprecated flags only produce warnings.
    pub fn resolved_threads(&self) -> Option<String> {
        if self.mpi {
            warn!("--mpi is deprecated and ignored; the engine runs with shared-memory threads.");
        }
        match (&self.threads, &self.cpus) {
            (Some(threads), Some(_)) => {
                warn!("--CPUs is deprecated and overridden by --threads.");
                Some(threads.clone())
            }
            (Some(threads), None) => Some(threads.clone()),
            (None, Some(cpus)) => {
                warn!("--CPUs is deprecated; use --threads instead.");
                Some(cpus.clone())
            }
            (None, None) => None,
        }
    }
}

mod cli;
mod error;
mod logging;
mod progress;
mod run;

use crate::cli::Cli;
use crate::error::{CliError, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use pinchoff::case::CaseError;
use tracing::{debug, error, info};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            std::process::exit(code);
        }
    };

    match run_app(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("\n❌ Error: {}", e);
            if matches!(e, CliError::Case(CaseError::InvalidThreadCount(_))) {
                eprintln!("\n{}", Cli::command().render_usage());
            }
            std::process::exit(e.exit_code());
        }
    }
}

fn run_app(cli: Cli) -> Result<i32> {
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook
        .install()
        .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to install error hook: {}", e)))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    info!("🚀 runcase v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let result = run::run(&cli);
    match &result {
        Ok(0) => info!("✅ Case run completed successfully."),
        Ok(code) => error!("❌ Engine exited with code {}.", code),
        Err(e) => error!("❌ Case run failed: {}", e),
    }
    result
}

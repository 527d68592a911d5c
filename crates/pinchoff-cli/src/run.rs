use crate::cli::Cli;
use crate::error::Result;
use crate::progress::CliProgressHandler;
use pinchoff::case::{
    CaseDescriptor, CaseDriver, CaseError, CaseOutcome, CaseRequest, DriverConfig,
};
use pinchoff::progress::ProgressReporter;
use tracing::{debug, info};

/// Runs one case and returns the process exit code.
pub fn run(cli: &Cli) -> Result<i32> {
    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir()?,
    };
    let config = DriverConfig::for_root(root)?;
    debug!("Driver configuration: {:?}", config);

    let request = CaseRequest {
        params_file: cli.params_file.clone(),
        exec: cli.exec.clone(),
        threads: cli.resolved_threads(),
    };

    let progress = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress.get_callback());
    let driver = CaseDriver::system(config).with_reporter(reporter);

    let plan = driver.preflight(&request)?;
    print_plan(&plan.descriptor);

    let outcome = match driver.run_plan(plan) {
        Ok(outcome) => outcome,
        Err(e) => {
            progress.abandon();
            if let CaseError::BuildFailed { diagnostics, .. } = &e {
                eprint!("{}", diagnostics);
            }
            return Err(e.into());
        }
    };

    print_summary(&outcome);
    Ok(outcome.exit_code())
}

fn print_plan(descriptor: &CaseDescriptor) {
    println!("Case {}", descriptor.case_no);
    println!("  Parameters: {}", descriptor.params_file.display());
    println!("  Engine:     {}", descriptor.source.display());
    println!("  Threads:    {}", descriptor.threads);
}

fn print_summary(outcome: &CaseOutcome) {
    let descriptor = &outcome.descriptor;
    if outcome.success() {
        info!("Case {} completed successfully.", descriptor.case_no);
        println!("✓ Case {} completed successfully.", descriptor.case_no);
        println!("  Output: {}", descriptor.case_dir.display());
        println!("  Log:    {}", descriptor.log_path().display());
    } else {
        eprintln!(
            "✗ Case {} failed ({}).",
            descriptor.case_no, outcome.exit
        );
        eprintln!("  Output: {}", descriptor.case_dir.display());
    }
}

//! # Case Module
//!
//! Stages and executes exactly one simulation case.
//!
//! ## Protocol
//!
//! 1. Resolve the engine source, parameter file and thread count.
//! 2. Pre-flight: validate the thread count, locate the build tool, check that both input
//!    files exist and read a valid `CaseNo` from the parameter file.
//! 3. Stage `simulationCases/<CaseNo>/` with a copy of the parameters (`case.params`) and
//!    of the engine source.
//! 4. Compile the engine inside the case directory.
//! 5. Report whether a checkpoint will be resumed, then run the engine with the requested
//!    thread count and hand back its exit status.
//!
//! Nothing is written to disk until every pre-flight check has passed. External programs
//! are invoked through the [`ProcessRunner`] and [`ToolLocator`] seams with explicit
//! argument vectors; no shell is involved.

pub mod config;
pub mod defaults;
mod descriptor;
mod driver;
pub mod error;
mod runner;
mod staging;
mod toolchain;

pub use config::{DriverConfig, DriverConfigBuilder};
pub use descriptor::{
    CaseDescriptor, CaseNumber, ThreadCount, engine_source_name, extract_case_number,
};
pub use driver::{CaseDriver, CaseOutcome, CasePlan, CaseRequest};
pub use error::{CaseError, CaseNoProblem};
pub use runner::{CapturedOutput, CommandSpec, ProcessExit, ProcessRunner, SystemRunner};
pub use staging::stage_case;
pub use toolchain::{PathToolLocator, ToolLocator};

//! # Pinchoff Core Library
//!
//! Runtime configuration and case-execution harness for axisymmetric viscoelastic
//! pinch-off simulations. The numerical solver itself is an external program; this
//! library covers everything around it.
//!
//! ## Architecture
//!
//! - **[`params`]: The Foundation.** A forgiving `key=value` parameter store with typed,
//!   defaulting accessors. Malformed or missing values never abort the host process;
//!   they degrade to the caller's default and a structured warning.
//!
//! - **[`engine`]: Reserved Parameters.** The typed, validated view of the keys the
//!   simulation engine consumes at startup (`CaseNo`, `MAXlevel`, `Oh`, ...).
//!
//! - **[`case`]: The Case Driver.** Stages an isolated case directory, compiles the
//!   engine source, detects checkpoints, runs the engine as a child process and
//!   propagates its exit status.
//!
//! - **[`progress`]: Reporting.** A callback-based progress channel the driver uses to
//!   tell front-ends which phase it is in.

pub mod case;
pub mod engine;
pub mod params;
pub mod progress;

//! # Engine Module
//!
//! The typed view of the reserved keys the simulation engine reads at startup.
//! Parameter files are parsed leniently by [`crate::params`]; this module is where the
//! physical constraints (`CaseNo` floor, `0 < dtmax <= tmax`, ...) are enforced.

pub mod error;
mod parameters;

pub use error::EngineParamError;
pub use parameters::{
    CASE_NO_FLOOR, EngineParameters, KEY_CASE_NO, KEY_DE, KEY_DTMAX, KEY_EC, KEY_MAX_LEVEL,
    KEY_OH, KEY_OHA, KEY_TMAX,
};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum EngineParamError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("CaseNo must be at least {floor}, got {value}")]
    CaseNoBelowFloor { value: i32, floor: i32 },

    #[error("Parameter '{key}' must be {constraint}, got {value}")]
    OutOfRange {
        key: &'static str,
        constraint: &'static str,
        value: f64,
    },

    #[error("dtmax ({dtmax}) must satisfy 0 < dtmax <= tmax ({tmax})")]
    InvalidTimeStep { dtmax: f64, tmax: f64 },
}

use pinchoff::case::CaseError;
use pinchoff::case::config::ConfigError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Case(#[from] CaseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Exit status for a run that never reached the engine.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Case(e) => e.exit_code(),
            _ => 1,
        }
    }
}

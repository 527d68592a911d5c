use std::path::PathBuf;
use thiserror::Error;

/// Why a `CaseNo` could not be taken from a parameter file.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CaseNoProblem {
    #[error("no 'CaseNo=' entry found")]
    Missing,

    #[error("'{0}' is not a non-negative integer")]
    NotNumeric(String),

    #[error("{value} is below the minimum of {floor} (case numbers must be 4+ digits)")]
    BelowFloor { value: u64, floor: u64 },

    #[error("'{value}' exceeds the largest case number the engine accepts ({ceiling})")]
    AboveCeiling { value: String, ceiling: u64 },
}

#[derive(Debug, Error)]
pub enum CaseError {
    #[error("Invalid thread count '{0}': must be a positive integer")]
    InvalidThreadCount(String),

    #[error(
        "Build tool '{tool}' was not found on PATH. Install it or add its directory to PATH."
    )]
    BuildToolNotFound { tool: String },

    #[error("Parameter file not found: {}", path.display())]
    ParamsFileNotFound { path: PathBuf },

    #[error("Parameter file {} could not be read: {source}", path.display())]
    ParamsFileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine source '{name}' not found (searched: {})", display_paths(searched))]
    SourceNotFound { name: String, searched: Vec<PathBuf> },

    #[error("Invalid CaseNo in {}: {problem}", path.display())]
    CaseNumber {
        path: PathBuf,
        problem: CaseNoProblem,
    },

    #[error("Failed to stage case directory {}: {source}", path.display())]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch '{}': {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Compilation of '{source_name}' failed{}", describe_code(*code))]
    BuildFailed {
        source_name: String,
        code: Option<i32>,
        diagnostics: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CaseError {
    /// Process exit code the driver should terminate with.
    ///
    /// Pre-flight and staging failures map to `1`; a failed compilation keeps the build
    /// tool's own code when it has one.
    pub fn exit_code(&self) -> i32 {
        match self {
            CaseError::BuildFailed {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }

    /// `true` for failures detected before the case directory is touched.
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            CaseError::InvalidThreadCount(_)
                | CaseError::BuildToolNotFound { .. }
                | CaseError::ParamsFileNotFound { .. }
                | CaseError::ParamsFileUnreadable { .. }
                | CaseError::SourceNotFound { .. }
                | CaseError::CaseNumber { .. }
        )
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!(" with exit code {}", code),
        None => " (terminated by signal)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_failure_keeps_tool_exit_code() {
        let err = CaseError::BuildFailed {
            source_name: "LiquidOutThinning.c".to_string(),
            code: Some(2),
            diagnostics: String::new(),
        };
        assert_eq!(err.exit_code(), 2);
        assert!(!err.is_preflight());
        assert_eq!(
            err.to_string(),
            "Compilation of 'LiquidOutThinning.c' failed with exit code 2"
        );
    }

    #[test]
    fn signalled_build_and_preflight_errors_exit_with_one() {
        let signalled = CaseError::BuildFailed {
            source_name: "a.c".to_string(),
            code: None,
            diagnostics: String::new(),
        };
        assert_eq!(signalled.exit_code(), 1);

        let preflight = CaseError::InvalidThreadCount("0".to_string());
        assert_eq!(preflight.exit_code(), 1);
        assert!(preflight.is_preflight());
    }

    #[test]
    fn unreadable_params_file_names_the_path() {
        let err = CaseError::ParamsFileUnreadable {
            path: PathBuf::from("/p/default.params"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.is_preflight());
        assert_eq!(err.exit_code(), 1);
        assert!(
            err.to_string()
                .starts_with("Parameter file /p/default.params could not be read: ")
        );
    }

    #[test]
    fn source_not_found_lists_searched_locations() {
        let err = CaseError::SourceNotFound {
            name: "engine.c".to_string(),
            searched: vec![PathBuf::from("/p/engine.c"), PathBuf::from("/p/cases/engine.c")],
        };
        assert_eq!(
            err.to_string(),
            "Engine source 'engine.c' not found (searched: /p/engine.c, /p/cases/engine.c)"
        );
    }
}

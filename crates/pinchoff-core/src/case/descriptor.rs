use super::defaults;
use super::error::{CaseError, CaseNoProblem};
use crate::engine::{CASE_NO_FLOOR, KEY_CASE_NO};
use crate::params::parse_line;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const CASE_NO_CEILING: u64 = i32::MAX as u64;

/// A validated case identifier (`>= 1000`, and small enough for the engine's `int` read).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaseNumber(u64);

impl CaseNumber {
    pub fn new(value: u64) -> Result<Self, CaseNoProblem> {
        let floor = CASE_NO_FLOOR as u64;
        if value < floor {
            return Err(CaseNoProblem::BelowFloor { value, floor });
        }
        if value > CASE_NO_CEILING {
            return Err(CaseNoProblem::AboveCeiling {
                value: value.to_string(),
                ceiling: CASE_NO_CEILING,
            });
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl FromStr for CaseNumber {
    type Err = CaseNoProblem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CaseNoProblem::NotNumeric(s.to_string()));
        }
        match s.parse::<u64>() {
            Ok(value) => Self::new(value),
            // All digits, so the only failure left is overflow.
            Err(_) => Err(CaseNoProblem::AboveCeiling {
                value: s.to_string(),
                ceiling: CASE_NO_CEILING,
            }),
        }
    }
}

impl fmt::Display for CaseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of engine threads; always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadCount(NonZeroUsize);

impl ThreadCount {
    pub fn new(threads: usize) -> Option<Self> {
        NonZeroUsize::new(threads).map(Self)
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl FromStr for ThreadCount {
    type Err = CaseError;

    /// Accepts plain decimal digits only, so `-3`, `+4` and `2.5` are all rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CaseError::InvalidThreadCount(s.to_string());
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        s.parse::<usize>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for ThreadCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalizes an `--exec` value to a source file name, appending `.c` when absent.
pub fn engine_source_name(exec: &str) -> String {
    let has_extension = Path::new(exec)
        .extension()
        .is_some_and(|ext| ext == defaults::SOURCE_EXTENSION);
    if has_extension {
        exec.to_string()
    } else {
        format!("{}.{}", exec, defaults::SOURCE_EXTENSION)
    }
}

/// Takes the case number from the first non-comment `CaseNo=` line of a parameter file.
///
/// Unlike [`crate::params::ParamStore`], later duplicates are ignored: the driver names the
/// directory after the first declaration it sees.
pub fn extract_case_number(text: &str) -> Result<CaseNumber, CaseNoProblem> {
    let raw = text
        .lines()
        .filter_map(parse_line)
        .find(|(key, _)| *key == KEY_CASE_NO)
        .map(|(_, value)| value)
        .ok_or(CaseNoProblem::Missing)?;
    raw.parse()
}

/// Everything the driver knows about one case after pre-flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseDescriptor {
    pub case_no: CaseNumber,
    /// Absolute path of the engine source outside the case directory.
    pub source: PathBuf,
    /// Absolute path of the input parameter file.
    pub params_file: PathBuf,
    pub threads: ThreadCount,
    /// Absolute path of `simulationCases/<CaseNo>`.
    pub case_dir: PathBuf,
}

impl CaseDescriptor {
    pub fn source_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Name of the compiled engine: the source name without its extension.
    pub fn binary_name(&self) -> String {
        self.source
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn binary_path(&self) -> PathBuf {
        self.case_dir.join(self.binary_name())
    }

    pub fn log_file_name(&self) -> String {
        format!("c{}-log", self.case_no)
    }

    pub fn log_path(&self) -> PathBuf {
        self.case_dir.join(self.log_file_name())
    }
}

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// The target type an accessor attempted to convert a raw value into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Int,
    Double,
    Bool,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Int => "int",
            ValueKind::Double => "double",
            ValueKind::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// A non-fatal condition raised while loading or reading parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamWarning {
    /// The parameter file could not be opened; the store stays empty.
    FileNotFound { path: PathBuf },
    /// A new key arrived after the store reached its capacity and was dropped.
    CapacityExceeded { capacity: usize, key: String },
    /// A stored value failed to convert; `default` is the value handed back instead.
    InvalidValue {
        key: String,
        raw: String,
        kind: ValueKind,
        default: String,
    },
}

impl fmt::Display for ParamWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamWarning::FileNotFound { path } => write!(
                f,
                "Parameter file '{}' not found. Using defaults.",
                path.display()
            ),
            ParamWarning::CapacityExceeded { capacity, key } => write!(
                f,
                "Parameter entry limit reached ({}), skipping '{}'",
                capacity, key
            ),
            ParamWarning::InvalidValue {
                key,
                raw,
                kind,
                default,
            } => write!(
                f,
                "Invalid {} for '{}' ('{}'), using default {}",
                kind, key, raw, default
            ),
        }
    }
}

/// Destination for [`ParamWarning`]s.
///
/// Decouples the warning policy from parsing: the store decides *that* something is
/// wrong, the sink decides where it goes.
pub trait WarningSink: Send {
    fn emit(&self, warning: ParamWarning);
}

/// Forwards warnings to the `tracing` subscriber at `WARN` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn emit(&self, warning: ParamWarning) {
        match &warning {
            ParamWarning::FileNotFound { path } => {
                warn!(path = %path.display(), "{}", warning)
            }
            ParamWarning::CapacityExceeded { capacity, key } => {
                warn!(capacity, key = %key, "{}", warning)
            }
            ParamWarning::InvalidValue { key, kind, .. } => {
                warn!(key = %key, kind = %kind, "{}", warning)
            }
        }
    }
}

/// Keeps every warning in memory. Clones share the same buffer, so a handle kept by the
/// caller observes warnings emitted through the copy owned by a store.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    warnings: Arc<Mutex<Vec<ParamWarning>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> Vec<ParamWarning> {
        self.warnings
            .lock()
            .map(|w| w.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.warnings.lock().map(|w| w.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut w) = self.warnings.lock() {
            w.clear();
        }
    }
}

impl WarningSink for CollectingSink {
    fn emit(&self, warning: ParamWarning) {
        if let Ok(mut w) = self.warnings.lock() {
            w.push(warning);
        }
    }
}

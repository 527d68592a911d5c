//! # Parameter Module
//!
//! Loads flat `key=value` parameter files and exposes their contents through typed,
//! defaulting accessors.
//!
//! ## File Format
//!
//! One entry per line. `#` starts a comment that runs to the end of the line, blank and
//! comment-only lines are ignored, and key and value are trimmed of surrounding ASCII
//! whitespace. There is no quoting or escaping. When a key appears more than once the
//! last occurrence wins.
//!
//! ```text
//! # viscoelastic pinch-off
//! CaseNo   = 1000
//! MAXlevel = 10      # grid resolution
//! Oh       = 0.5
//! ```
//!
//! ## Failure Policy
//!
//! Nothing in this module aborts the caller. A missing file leaves the store empty, an
//! over-capacity insert is dropped, and a malformed value resolves to the caller's
//! default. Every such event is reported as a [`ParamWarning`] through the store's
//! [`WarningSink`].

mod accessors;
pub mod sink;
pub mod store;

pub use sink::{CollectingSink, ParamWarning, TracingSink, ValueKind, WarningSink};
pub use store::{
    DEFAULT_CAPACITY, DEFAULT_SOURCE, LoadError, ParamEntry, ParamStore, ParamStoreBuilder,
    parse_line,
};

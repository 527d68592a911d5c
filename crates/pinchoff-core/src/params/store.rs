use super::sink::{ParamWarning, TracingSink, WarningSink};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

/// Source file used when no path has been configured.
pub const DEFAULT_SOURCE: &str = "case.params";

/// Maximum number of distinct keys a store accepts unless configured otherwise.
pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Parameter file '{path}' could not be read: {source}", path = path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamEntry {
    pub key: String,
    pub value: String,
}

/// Splits one physical line into a trimmed `(key, value)` pair.
///
/// Everything from the first `#` is discarded, the first `=` separates key from value,
/// and both halves are trimmed of ASCII whitespace. Returns `None` for lines without an
/// `=` and for lines whose key or value is empty after trimming.
pub fn parse_line(line: &str) -> Option<(&str, &str)> {
    let content = match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    };
    let (key, value) = content.split_once('=')?;
    let key = key.trim_ascii();
    let value = value.trim_ascii();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// An insertion-ordered, capacity-bounded map of parameter keys to values, tied to one
/// source file at a time.
///
/// The store is lazily loaded: the first lookup through [`ParamStore::get`] (or any typed
/// accessor) loads the configured source if no explicit load has happened yet. Every
/// load replaces the previous contents entirely.
pub struct ParamStore {
    entries: Vec<ParamEntry>,
    index: HashMap<String, usize>,
    capacity: Option<usize>,
    source: PathBuf,
    loaded: bool,
    warned_missing: bool,
    pub(super) sink: Box<dyn WarningSink>,
}

pub struct ParamStoreBuilder {
    capacity: Option<usize>,
    source: PathBuf,
    sink: Box<dyn WarningSink>,
}

impl Default for ParamStoreBuilder {
    fn default() -> Self {
        Self {
            capacity: Some(DEFAULT_CAPACITY),
            source: PathBuf::from(DEFAULT_SOURCE),
            sink: Box::new(TracingSink),
        }
    }
}

impl ParamStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }
    pub fn unbounded(mut self) -> Self {
        self.capacity = None;
        self
    }
    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = path.into();
        self
    }
    pub fn sink(mut self, sink: impl WarningSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn build(self) -> ParamStore {
        ParamStore {
            entries: Vec::new(),
            index: HashMap::new(),
            capacity: self.capacity,
            source: self.source,
            loaded: false,
            warned_missing: false,
            sink: self.sink,
        }
    }
}

impl Default for ParamStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ParamStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamStore")
            .field("entries", &self.entries)
            .field("capacity", &self.capacity)
            .field("source", &self.source)
            .field("loaded", &self.loaded)
            .finish_non_exhaustive()
    }
}

impl ParamStore {
    /// An empty, unloaded store reading from [`DEFAULT_SOURCE`] with the default capacity.
    pub fn new() -> Self {
        ParamStoreBuilder::default().build()
    }

    pub fn builder() -> ParamStoreBuilder {
        ParamStoreBuilder::new()
    }

    /// Replaces the store's contents with the entries of `path`.
    ///
    /// The store counts as loaded afterwards even when the file cannot be opened; in that
    /// case it is left empty and a [`ParamWarning::FileNotFound`] is emitted, once, until a
    /// later load succeeds.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let path = path.as_ref();
        self.clear();
        self.loaded = true;
        self.source = path.to_path_buf();

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(source) => {
                if !self.warned_missing {
                    self.sink.emit(ParamWarning::FileNotFound {
                        path: path.to_path_buf(),
                    });
                    self.warned_missing = true;
                }
                return Err(LoadError::NotFound {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        self.warned_missing = false;

        let text = String::from_utf8_lossy(&bytes);
        self.insert_lines(&text);
        debug!(
            "Loaded {} parameter(s) from {:?}",
            self.entries.len(),
            path
        );
        Ok(())
    }

    /// Replaces the store's contents with the entries parsed from `text`, using the same
    /// line rules as [`ParamStore::load`]. The configured source path is left unchanged.
    pub fn load_str(&mut self, text: &str) {
        self.clear();
        self.loaded = true;
        self.insert_lines(text);
    }

    /// Selects the source from the first positional argument of an argv-style list
    /// (`args[0]` being the program name) and loads it. An absent or empty argument selects
    /// [`DEFAULT_SOURCE`]. A load failure has already been reported through the sink; the
    /// returned error may be ignored.
    pub fn init_from_args<I, S>(&mut self, args: I) -> Result<(), LoadError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let source = args
            .into_iter()
            .nth(1)
            .map(|arg| PathBuf::from(arg.as_ref()))
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE));
        self.load(source)
    }

    /// Inserts or updates `key`. A new key arriving at a full store is dropped with a
    /// [`ParamWarning::CapacityExceeded`]; the store is left unchanged.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        if let Some(&idx) = self.index.get(&key) {
            self.entries[idx].value = value;
            return;
        }

        if let Some(capacity) = self.capacity {
            if self.entries.len() >= capacity {
                self.sink
                    .emit(ParamWarning::CapacityExceeded { capacity, key });
                return;
            }
        }

        trace!("Setting parameter '{}' = '{}'", key, value);
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push(ParamEntry { key, value });
    }

    /// Returns the stored value for `key`, loading the configured source first if this
    /// store has never been loaded.
    pub fn get(&mut self, key: &str) -> Option<&str> {
        self.ensure_loaded();
        self.peek(key)
    }

    /// Looks up `key` without triggering a lazy load.
    pub fn peek(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .map(|&idx| self.entries[idx].value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Entries in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ParamEntry> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub(super) fn ensure_loaded(&mut self) {
        if !self.loaded {
            let source = self.source.clone();
            let _ = self.load(source);
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    fn insert_lines(&mut self, text: &str) {
        for line in text.lines() {
            if let Some((key, value)) = parse_line(line) {
                self.set(key, value);
            }
        }
    }
}

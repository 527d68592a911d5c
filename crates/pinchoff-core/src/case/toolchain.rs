use std::path::PathBuf;
use tracing::debug;

/// Finds external build tools.
pub trait ToolLocator {
    fn locate(&self, tool: &str) -> Option<PathBuf>;
}

/// Searches the `PATH` of the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathToolLocator;

impl ToolLocator for PathToolLocator {
    fn locate(&self, tool: &str) -> Option<PathBuf> {
        match which::which(tool) {
            Ok(path) => {
                debug!("Found '{}' at {:?}", tool, path);
                Some(path)
            }
            Err(e) => {
                debug!("'{}' not found on PATH: {}", tool, e);
                None
            }
        }
    }
}

use super::defaults;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Project root {0:?} could not be made absolute")]
    UnresolvableRoot(PathBuf),
}

/// Where cases live, how the engine is built and how it is launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Absolute directory that relative inputs are resolved against.
    pub project_root: PathBuf,
    pub cases_dir: PathBuf,
    pub default_source: String,
    pub default_params_file: PathBuf,
    pub default_threads: usize,
    pub build_tool: String,
    pub compile_flags: Vec<String>,
    pub concurrency_flag: String,
    pub include_dirs: Vec<PathBuf>,
    pub link_libs: Vec<String>,
    pub thread_env_var: String,
    pub local_params_name: String,
    pub checkpoint_name: String,
}

impl DriverConfig {
    /// Conventional configuration for a project rooted at `root`.
    pub fn for_root(root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        DriverConfigBuilder::new().project_root(root).build()
    }

    pub fn cases_root(&self) -> PathBuf {
        self.project_root.join(&self.cases_dir)
    }

    /// Resolves `path` against the project root unless it is already absolute.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}

#[derive(Debug, Default)]
pub struct DriverConfigBuilder {
    project_root: Option<PathBuf>,
    cases_dir: Option<PathBuf>,
    default_source: Option<String>,
    default_params_file: Option<PathBuf>,
    default_threads: Option<usize>,
    build_tool: Option<String>,
    compile_flags: Option<Vec<String>>,
    include_dirs: Option<Vec<PathBuf>>,
    thread_env_var: Option<String>,
    checkpoint_name: Option<String>,
}

impl DriverConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }
    pub fn cases_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cases_dir = Some(dir.into());
        self
    }
    pub fn default_source(mut self, name: impl Into<String>) -> Self {
        self.default_source = Some(name.into());
        self
    }
    pub fn default_params_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_params_file = Some(path.into());
        self
    }
    pub fn default_threads(mut self, threads: usize) -> Self {
        self.default_threads = Some(threads);
        self
    }
    pub fn build_tool(mut self, tool: impl Into<String>) -> Self {
        self.build_tool = Some(tool.into());
        self
    }
    pub fn compile_flags(mut self, flags: Vec<String>) -> Self {
        self.compile_flags = Some(flags);
        self
    }
    pub fn include_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.include_dirs = Some(dirs);
        self
    }
    pub fn thread_env_var(mut self, var: impl Into<String>) -> Self {
        self.thread_env_var = Some(var.into());
        self
    }
    pub fn checkpoint_name(mut self, name: impl Into<String>) -> Self {
        self.checkpoint_name = Some(name.into());
        self
    }

    /// Include directories default to `<root>/src-local` when that directory exists.
    pub fn build(self) -> Result<DriverConfig, ConfigError> {
        let root = self
            .project_root
            .ok_or(ConfigError::MissingParameter("project_root"))?;
        let project_root =
            std::path::absolute(&root).map_err(|_| ConfigError::UnresolvableRoot(root))?;

        let include_dirs = self.include_dirs.unwrap_or_else(|| {
            let local = project_root.join(defaults::INCLUDE_DIR);
            if local.is_dir() { vec![local] } else { Vec::new() }
        });

        Ok(DriverConfig {
            cases_dir: self
                .cases_dir
                .unwrap_or_else(|| PathBuf::from(defaults::CASES_DIR)),
            default_source: self
                .default_source
                .unwrap_or_else(|| defaults::ENGINE_SOURCE.to_string()),
            default_params_file: self
                .default_params_file
                .unwrap_or_else(|| PathBuf::from(defaults::PARAMS_FILE)),
            default_threads: self.default_threads.unwrap_or(defaults::THREADS),
            build_tool: self
                .build_tool
                .unwrap_or_else(|| defaults::BUILD_TOOL.to_string()),
            compile_flags: self.compile_flags.unwrap_or_else(|| {
                defaults::COMPILE_FLAGS.iter().map(|s| s.to_string()).collect()
            }),
            concurrency_flag: defaults::CONCURRENCY_FLAG.to_string(),
            include_dirs,
            link_libs: defaults::LINK_LIBS.iter().map(|s| s.to_string()).collect(),
            thread_env_var: self
                .thread_env_var
                .unwrap_or_else(|| defaults::THREAD_ENV_VAR.to_string()),
            local_params_name: defaults::LOCAL_PARAMS_NAME.to_string(),
            checkpoint_name: self
                .checkpoint_name
                .unwrap_or_else(|| defaults::CHECKPOINT_NAME.to_string()),
            project_root,
        })
    }
}

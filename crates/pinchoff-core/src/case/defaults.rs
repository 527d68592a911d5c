//! Project conventions the driver falls back on when nothing else is specified.

pub const ENGINE_SOURCE: &str = "LiquidOutThinning.c";
pub const PARAMS_FILE: &str = "default.params";
pub const THREADS: usize = 4;

pub const CASES_DIR: &str = "simulationCases";
pub const LOCAL_PARAMS_NAME: &str = "case.params";
pub const CHECKPOINT_NAME: &str = "dump";
pub const INCLUDE_DIR: &str = "src-local";

pub const BUILD_TOOL: &str = "qcc";
pub const COMPILE_FLAGS: [&str; 3] = ["-O2", "-Wall", "-disable-dimensions"];
pub const CONCURRENCY_FLAG: &str = "-fopenmp";
pub const LINK_LIBS: [&str; 1] = ["-lm"];
pub const THREAD_ENV_VAR: &str = "OMP_NUM_THREADS";

pub const SOURCE_EXTENSION: &str = "c";

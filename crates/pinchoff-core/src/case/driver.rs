use super::config::DriverConfig;
use super::descriptor::{CaseDescriptor, ThreadCount, engine_source_name, extract_case_number};
use super::error::CaseError;
use super::runner::{CommandSpec, ProcessExit, ProcessRunner, SystemRunner};
use super::staging::stage_case;
use super::toolchain::{PathToolLocator, ToolLocator};
use crate::progress::{Progress, ProgressReporter};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Raw, operator-supplied inputs. `None` selects the configured default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseRequest {
    pub params_file: Option<PathBuf>,
    pub exec: Option<String>,
    pub threads: Option<String>,
}

/// The result of a successful pre-flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CasePlan {
    pub descriptor: CaseDescriptor,
    pub build_tool: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseOutcome {
    pub descriptor: CaseDescriptor,
    pub exit: ProcessExit,
    /// A checkpoint was present when the engine started.
    pub resumed: bool,
}

impl CaseOutcome {
    pub fn success(&self) -> bool {
        self.exit.success()
    }

    pub fn exit_code(&self) -> i32 {
        self.exit.exit_code()
    }
}

pub struct CaseDriver<'a, R = SystemRunner, L = PathToolLocator> {
    config: DriverConfig,
    runner: R,
    locator: L,
    reporter: ProgressReporter<'a>,
}

impl CaseDriver<'_> {
    /// A driver that launches real processes and searches the real `PATH`.
    pub fn system(config: DriverConfig) -> Self {
        Self::new(config, SystemRunner, PathToolLocator)
    }
}

impl<'a, R: ProcessRunner, L: ToolLocator> CaseDriver<'a, R, L> {
    pub fn new(config: DriverConfig, runner: R, locator: L) -> Self {
        Self {
            config,
            runner,
            locator,
            reporter: ProgressReporter::new(),
        }
    }

    pub fn with_reporter(mut self, reporter: ProgressReporter<'a>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Stages, builds and runs one case.
    ///
    /// Returns `Ok` whenever the engine was started, whatever its exit status; the
    /// outcome carries that status. `Err` means the engine never ran.
    pub fn run(&self, request: &CaseRequest) -> Result<CaseOutcome, CaseError> {
        let plan = self.preflight(request)?;
        self.run_plan(plan)
    }

    /// Stages, builds and runs a case that has already passed [`CaseDriver::preflight`].
    pub fn run_plan(&self, plan: CasePlan) -> Result<CaseOutcome, CaseError> {
        let descriptor = &plan.descriptor;

        self.reporter.phase("Staging case directory", || {
            stage_case(descriptor, &self.config.local_params_name)
        })?;
        self.reporter
            .phase("Compiling engine", || self.build(&plan))?;

        let resumed = self.checkpoint_present(descriptor);
        if resumed {
            self.reporter.report(Progress::Message(format!(
                "Checkpoint '{}' found, the engine will resume from it.",
                self.config.checkpoint_name
            )));
        }

        self.reporter.report(Progress::Message(format!(
            "Running case {} with {} thread(s)...",
            descriptor.case_no, descriptor.threads
        )));
        let exit = self.execute(descriptor)?;
        if exit.success() {
            info!("Case {} finished successfully", descriptor.case_no);
        } else {
            warn!("Case {} ended with {}", descriptor.case_no, exit);
        }

        Ok(CaseOutcome {
            descriptor: plan.descriptor,
            exit,
            resumed,
        })
    }

    /// Resolves inputs and performs every check that must pass before anything is
    /// written: thread count, build tool, input files and `CaseNo`.
    pub fn preflight(&self, request: &CaseRequest) -> Result<CasePlan, CaseError> {
        let threads = match &request.threads {
            Some(raw) => raw.trim().parse::<ThreadCount>()?,
            None => ThreadCount::new(self.config.default_threads).ok_or_else(|| {
                CaseError::InvalidThreadCount(self.config.default_threads.to_string())
            })?,
        };

        let build_tool = self
            .locator
            .locate(&self.config.build_tool)
            .ok_or_else(|| CaseError::BuildToolNotFound {
                tool: self.config.build_tool.clone(),
            })?;

        let params_file = self.config.resolve(
            request
                .params_file
                .as_deref()
                .unwrap_or(self.config.default_params_file.as_path()),
        );
        if !params_file.is_file() {
            return Err(CaseError::ParamsFileNotFound { path: params_file });
        }

        let source = self.locate_source(request.exec.as_deref())?;

        let text = fs::read(&params_file).map_err(|source| CaseError::ParamsFileUnreadable {
            path: params_file.clone(),
            source,
        })?;
        let case_no = extract_case_number(&String::from_utf8_lossy(&text)).map_err(|problem| {
            CaseError::CaseNumber {
                path: params_file.clone(),
                problem,
            }
        })?;

        let case_dir = self.config.cases_root().join(case_no.to_string());
        debug!(
            "Pre-flight passed: case {} in {:?}, source {:?}, {} thread(s)",
            case_no, case_dir, source, threads
        );

        Ok(CasePlan {
            descriptor: CaseDescriptor {
                case_no,
                source,
                params_file,
                threads,
                case_dir,
            },
            build_tool,
        })
    }

    /// Compiles the staged source inside the case directory.
    pub fn build(&self, plan: &CasePlan) -> Result<(), CaseError> {
        let descriptor = &plan.descriptor;
        let spec = self.build_command(plan);
        info!("Compiling: {}", spec);

        let output = self
            .runner
            .output(&spec)
            .map_err(|source| CaseError::Spawn {
                program: spec.program.clone(),
                source,
            })?;

        if !output.exit.success() {
            return Err(CaseError::BuildFailed {
                source_name: descriptor.source_name(),
                code: output.exit.code(),
                diagnostics: output.diagnostics(),
            });
        }

        let diagnostics = output.diagnostics();
        if !diagnostics.trim().is_empty() {
            info!("Compiler output:\n{}", diagnostics.trim_end());
        }
        Ok(())
    }

    pub fn build_command(&self, plan: &CasePlan) -> CommandSpec {
        let descriptor = &plan.descriptor;
        let mut spec = CommandSpec::new(&plan.build_tool, &descriptor.case_dir)
            .args(self.config.compile_flags.iter())
            .arg(&self.config.concurrency_flag);
        for dir in &self.config.include_dirs {
            let mut flag = std::ffi::OsString::from("-I");
            flag.push(dir);
            spec = spec.arg(flag);
        }
        spec.arg(descriptor.source_name())
            .arg("-o")
            .arg(descriptor.binary_name())
            .args(self.config.link_libs.iter())
    }

    pub fn engine_command(&self, descriptor: &CaseDescriptor) -> CommandSpec {
        CommandSpec::new(descriptor.binary_path(), &descriptor.case_dir)
            .arg(&self.config.local_params_name)
            .env(&self.config.thread_env_var, descriptor.threads.to_string())
    }

    fn execute(&self, descriptor: &CaseDescriptor) -> Result<ProcessExit, CaseError> {
        let spec = self.engine_command(descriptor);
        info!("Launching engine: {}", spec);
        self.runner
            .status(&spec)
            .map_err(|source| CaseError::Spawn {
                program: spec.program.clone(),
                source,
            })
    }

    fn checkpoint_present(&self, descriptor: &CaseDescriptor) -> bool {
        descriptor
            .case_dir
            .join(&self.config.checkpoint_name)
            .is_file()
    }

    /// Finds the engine source: first relative to the project root, then in the cases
    /// directory.
    fn locate_source(&self, exec: Option<&str>) -> Result<PathBuf, CaseError> {
        let name = exec
            .map(engine_source_name)
            .unwrap_or_else(|| self.config.default_source.clone());
        let as_path = Path::new(&name);

        let mut searched = vec![self.config.resolve(as_path)];
        if !as_path.is_absolute() {
            searched.push(self.config.cases_root().join(as_path));
        }

        match searched.iter().find(|p| p.is_file()) {
            Some(found) => Ok(found.clone()),
            None => Err(CaseError::SourceNotFound { name, searched }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::error::CaseNoProblem;
    use crate::case::runner::CapturedOutput;
    use std::cell::RefCell;
    use std::ffi::OsString;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tempfile::{TempDir, tempdir};

    #[derive(Default)]
    struct FakeRunner {
        build_exit: Option<ProcessExit>,
        engine_exit: Option<ProcessExit>,
        calls: RefCell<Vec<CommandSpec>>,
        case_dir_existed: RefCell<Vec<bool>>,
    }

    impl ProcessRunner for FakeRunner {
        fn output(&self, spec: &CommandSpec) -> io::Result<CapturedOutput> {
            self.case_dir_existed.borrow_mut().push(spec.cwd.is_dir());
            self.calls.borrow_mut().push(spec.clone());
            Ok(CapturedOutput {
                exit: self.build_exit.unwrap_or(ProcessExit::Code(0)),
                stdout: String::new(),
                stderr: "engine.c:1: error: nope\n".to_string(),
            })
        }

        fn status(&self, spec: &CommandSpec) -> io::Result<ProcessExit> {
            self.calls.borrow_mut().push(spec.clone());
            Ok(self.engine_exit.unwrap_or(ProcessExit::Code(0)))
        }
    }

    struct FakeLocator(Option<PathBuf>);

    impl ToolLocator for FakeLocator {
        fn locate(&self, _tool: &str) -> Option<PathBuf> {
            self.0.clone()
        }
    }

    fn qcc() -> FakeLocator {
        FakeLocator(Some(PathBuf::from("/opt/basilisk/qcc")))
    }

    fn project(params: &str) -> TempDir {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("simulationCases")).unwrap();
        fs::write(
            dir.path().join("simulationCases/LiquidOutThinning.c"),
            "int main() { return 0; }\n",
        )
        .unwrap();
        fs::write(dir.path().join("default.params"), params).unwrap();
        dir
    }

    fn make_driver(
        dir: &TempDir,
        runner: FakeRunner,
        locator: FakeLocator,
    ) -> CaseDriver<'static, FakeRunner, FakeLocator> {
        let config = DriverConfig::for_root(dir.path()).unwrap();
        CaseDriver::new(config, runner, locator)
    }

    fn threads(raw: &str) -> CaseRequest {
        CaseRequest {
            threads: Some(raw.to_string()),
            ..CaseRequest::default()
        }
    }

    #[test]
    fn preflight_resolves_defaults() {
        let dir = project("CaseNo=1000\n");
        let driver = make_driver(&dir, FakeRunner::default(), qcc());

        let plan = driver.preflight(&CaseRequest::default()).unwrap();
        let d = &plan.descriptor;

        assert_eq!(d.case_no.get(), 1000);
        assert_eq!(d.threads.get(), 4);
        assert_eq!(d.params_file, dir.path().join("default.params"));
        assert_eq!(d.source, dir.path().join("simulationCases/LiquidOutThinning.c"));
        assert_eq!(d.case_dir, dir.path().join("simulationCases/1000"));
        assert_eq!(plan.build_tool, PathBuf::from("/opt/basilisk/qcc"));
    }

    #[test]
    fn case_number_below_floor_fails_before_any_directory_exists() {
        let dir = project("CaseNo=999\n");
        let runner = FakeRunner::default();
        let driver = make_driver(&dir, runner, qcc());

        let err = driver.run(&CaseRequest::default()).unwrap_err();

        assert!(matches!(
            err,
            CaseError::CaseNumber {
                problem: CaseNoProblem::BelowFloor { value: 999, .. },
                ..
            }
        ));
        assert_eq!(err.exit_code(), 1);
        assert!(!dir.path().join("simulationCases/999").exists());
        assert!(driver.runner.calls.borrow().is_empty());
    }

    #[test]
    fn oversized_case_number_fails_before_any_directory_exists() {
        let dir = project("CaseNo=3000000000\n");
        let driver = make_driver(&dir, FakeRunner::default(), qcc());

        let err = driver.run(&CaseRequest::default()).unwrap_err();

        assert!(matches!(
            err,
            CaseError::CaseNumber {
                problem: CaseNoProblem::AboveCeiling { .. },
                ..
            }
        ));
        assert!(!dir.path().join("simulationCases/3000000000").exists());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_params_file_is_a_preflight_error_naming_the_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = project("CaseNo=1000\n");
        let params = dir.path().join("default.params");
        fs::set_permissions(&params, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read(&params).is_ok() {
            // Privileged users bypass file modes.
            return;
        }
        let driver = make_driver(&dir, FakeRunner::default(), qcc());

        let err = driver.run(&CaseRequest::default()).unwrap_err();

        assert!(matches!(
            err,
            CaseError::ParamsFileUnreadable { ref path, .. } if *path == params
        ));
        assert!(err.is_preflight());
        assert!(!dir.path().join("simulationCases/1000").exists());
    }

    #[test]
    fn zero_and_negative_thread_counts_are_rejected() {
        let dir = project("CaseNo=1000\n");
        let driver = make_driver(&dir, FakeRunner::default(), qcc());

        for raw in ["0", "-3"] {
            let err = driver.run(&threads(raw)).unwrap_err();
            assert!(matches!(err, CaseError::InvalidThreadCount(_)));
            assert_eq!(err.exit_code(), 1);
        }
        assert!(!dir.path().join("simulationCases/1000").exists());
    }

    #[test]
    fn thread_count_is_validated_before_the_build_tool_is_looked_up() {
        let dir = project("CaseNo=1000\n");
        let driver = make_driver(&dir, FakeRunner::default(), FakeLocator(None));

        assert!(matches!(
            driver.preflight(&threads("0")),
            Err(CaseError::InvalidThreadCount(_))
        ));
        assert!(matches!(
            driver.preflight(&threads("2")),
            Err(CaseError::BuildToolNotFound { ref tool }) if tool == "qcc"
        ));
    }

    #[test]
    fn missing_inputs_have_distinct_errors() {
        let dir = project("CaseNo=1000\n");
        let driver = make_driver(&dir, FakeRunner::default(), qcc());

        let missing_params = CaseRequest {
            params_file: Some(PathBuf::from("nope.params")),
            ..CaseRequest::default()
        };
        assert!(matches!(
            driver.preflight(&missing_params),
            Err(CaseError::ParamsFileNotFound { ref path }) if *path == dir.path().join("nope.params")
        ));

        let missing_source = CaseRequest {
            exec: Some("Other".to_string()),
            ..CaseRequest::default()
        };
        match driver.preflight(&missing_source) {
            Err(CaseError::SourceNotFound { name, searched }) => {
                assert_eq!(name, "Other.c");
                assert_eq!(
                    searched,
                    vec![
                        dir.path().join("Other.c"),
                        dir.path().join("simulationCases/Other.c")
                    ]
                );
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn exec_source_at_project_root_takes_precedence() {
        let dir = project("CaseNo=1000\n");
        fs::write(dir.path().join("Variant.c"), "").unwrap();
        let driver = make_driver(&dir, FakeRunner::default(), qcc());

        let request = CaseRequest {
            exec: Some("Variant".to_string()),
            ..CaseRequest::default()
        };
        let plan = driver.preflight(&request).unwrap();
        assert_eq!(plan.descriptor.source, dir.path().join("Variant.c"));
    }

    #[test]
    fn stages_before_building_and_runs_engine_with_thread_env() {
        let dir = project("CaseNo=1000\nMAXlevel=10\nOh=0.5\ntmax=1.0\ndtmax=0.0001\n");
        let driver = make_driver(&dir, FakeRunner::default(), qcc());

        let outcome = driver.run(&threads("2")).unwrap();
        let case_dir = dir.path().join("simulationCases/1000");

        assert!(outcome.success());
        assert_eq!(outcome.exit_code(), 0);
        assert!(!outcome.resumed);
        assert!(case_dir.join("case.params").is_file());
        assert!(case_dir.join("LiquidOutThinning.c").is_file());
        assert_eq!(outcome.descriptor.log_path(), case_dir.join("c1000-log"));

        assert_eq!(*driver.runner.case_dir_existed.borrow(), vec![true]);
        let calls = driver.runner.calls.borrow();
        assert_eq!(calls.len(), 2);

        let build = &calls[0];
        assert_eq!(build.program, PathBuf::from("/opt/basilisk/qcc"));
        assert_eq!(build.cwd, case_dir);
        assert_eq!(
            build.args,
            [
                "-O2",
                "-Wall",
                "-disable-dimensions",
                "-fopenmp",
                "LiquidOutThinning.c",
                "-o",
                "LiquidOutThinning",
                "-lm"
            ]
            .map(OsString::from)
        );

        let engine = &calls[1];
        assert_eq!(engine.program, case_dir.join("LiquidOutThinning"));
        assert_eq!(engine.cwd, case_dir);
        assert_eq!(engine.args, vec![OsString::from("case.params")]);
        assert_eq!(
            engine.env,
            vec![(OsString::from("OMP_NUM_THREADS"), OsString::from("2"))]
        );
    }

    #[test]
    fn include_directory_is_passed_to_the_build_tool() {
        let dir = project("CaseNo=1000\n");
        fs::create_dir(dir.path().join("src-local")).unwrap();
        let driver = make_driver(&dir, FakeRunner::default(), qcc());

        let plan = driver.preflight(&CaseRequest::default()).unwrap();
        let spec = driver.build_command(&plan);

        let mut expected = OsString::from("-I");
        expected.push(dir.path().join("src-local"));
        assert!(spec.args.contains(&expected));
    }

    #[test]
    fn engine_exit_code_is_propagated() {
        let dir = project("CaseNo=1000\n");
        let runner = FakeRunner {
            engine_exit: Some(ProcessExit::Code(1)),
            ..FakeRunner::default()
        };
        let driver = make_driver(&dir, runner, qcc());

        let outcome = driver.run(&CaseRequest::default()).unwrap();
        assert!(!outcome.success());
        assert_eq!(outcome.exit_code(), 1);

        let runner = FakeRunner {
            engine_exit: Some(ProcessExit::Signal(9)),
            ..FakeRunner::default()
        };
        let driver = make_driver(&dir, runner, qcc());
        assert_eq!(driver.run(&CaseRequest::default()).unwrap().exit_code(), 137);
    }

    #[test]
    fn build_failure_stops_before_running_the_engine() {
        let dir = project("CaseNo=1000\n");
        let runner = FakeRunner {
            build_exit: Some(ProcessExit::Code(2)),
            ..FakeRunner::default()
        };
        let driver = make_driver(&dir, runner, qcc());

        let err = driver.run(&CaseRequest::default()).unwrap_err();
        match &err {
            CaseError::BuildFailed {
                code, diagnostics, ..
            } => {
                assert_eq!(*code, Some(2));
                assert_eq!(diagnostics, "engine.c:1: error: nope\n");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.exit_code(), 2);
        assert_eq!(driver.runner.calls.borrow().len(), 1);
    }

    #[test]
    fn existing_checkpoint_is_reported_as_resume() {
        let dir = project("CaseNo=1000\n");
        let case_dir = dir.path().join("simulationCases/1000");
        fs::create_dir_all(&case_dir).unwrap();
        fs::write(case_dir.join("dump"), "state").unwrap();

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |p| {
            sink.lock().unwrap().push(p);
        }));
        let driver = make_driver(&dir, FakeRunner::default(), qcc()).with_reporter(reporter);

        let outcome = driver.run(&CaseRequest::default()).unwrap();
        assert!(outcome.resumed);

        let events = events.lock().unwrap();
        assert!(events.iter().any(|e| matches!(
            e,
            Progress::Message(msg) if msg.contains("resume")
        )));
        assert_eq!(
            events[0],
            Progress::PhaseStart {
                name: "Staging case directory"
            }
        );
    }

    #[test]
    fn spawn_failure_of_engine_is_an_error() {
        struct NoEngine;
        impl ProcessRunner for NoEngine {
            fn output(&self, _spec: &CommandSpec) -> io::Result<CapturedOutput> {
                Ok(CapturedOutput {
                    exit: ProcessExit::Code(0),
                    stdout: String::new(),
                    stderr: String::new(),
                })
            }
            fn status(&self, _spec: &CommandSpec) -> io::Result<ProcessExit> {
                Err(io::Error::new(io::ErrorKind::NotFound, "no binary"))
            }
        }

        let dir = project("CaseNo=1000\n");
        let config = DriverConfig::for_root(dir.path()).unwrap();
        let driver = CaseDriver::new(config, NoEngine, qcc());

        let err = driver.run(&CaseRequest::default()).unwrap_err();
        assert!(matches!(err, CaseError::Spawn { .. }));
        assert_eq!(err.exit_code(), 1);
    }
}

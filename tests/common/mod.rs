// Shared test helpers for integration tests
#![allow(dead_code)]

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use suite_runner::core::config::{ProviderConfig, TestRequest};
use suite_runner::core::execution::{ClassOutcome, TestClassRunner};
use suite_runner::core::filter::TestFilter;
use suite_runner::core::models::{RunResult, ScanResult, TestClass};
use suite_runner::core::order::{DefaultRunOrderCalculator, RunOrder};
use suite_runner::core::provider::ProviderParameters;
use suite_runner::infra::command::CommandReader;
use suite_runner::reporting::{Reporter, ReporterFactory};

lazy_static::lazy_static! {
    /// Serializes tests that touch the process-wide skip-on-next-test flag.
    pub static ref FAIL_FAST_GUARD: Mutex<()> = Mutex::new(());
}

/// One reporter event, recorded in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    CaptureStarted,
    SetStarting(String),
    Starting(String),
    Succeeded(String),
    Failed(String, String),
    Skipped(String),
    SetCompleted(String),
}

pub struct RecordingReporter {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Reporter for RecordingReporter {
    fn start_capture(&mut self) {
        self.push(Event::CaptureStarted);
    }

    fn test_set_starting(&mut self, name: &str) {
        self.push(Event::SetStarting(name.to_string()));
    }

    fn test_starting(&mut self, class: &TestClass) {
        self.push(Event::Starting(class.name().to_string()));
    }

    fn test_succeeded(&mut self, class: &TestClass) {
        self.push(Event::Succeeded(class.name().to_string()));
    }

    fn test_failed(&mut self, class: &TestClass, message: &str) {
        self.push(Event::Failed(class.name().to_string(), message.to_string()));
    }

    fn test_skipped(&mut self, class: &TestClass) {
        self.push(Event::Skipped(class.name().to_string()));
    }

    fn test_set_completed(&mut self, name: &str) {
        self.push(Event::SetCompleted(name.to_string()));
    }
}

impl RecordingReporter {
    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

/// A reporter factory that records every event and counts `close` calls.
pub struct RecordingReporterFactory {
    events: Arc<Mutex<Vec<Event>>>,
    close_calls: Arc<AtomicUsize>,
}

impl RecordingReporterFactory {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            close_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared handles, usable after the factory moved into the provider.
    pub fn handles(&self) -> (Arc<Mutex<Vec<Event>>>, Arc<AtomicUsize>) {
        (Arc::clone(&self.events), Arc::clone(&self.close_calls))
    }
}

impl ReporterFactory for RecordingReporterFactory {
    fn create_reporter(&mut self) -> Box<dyn Reporter> {
        Box::new(RecordingReporter {
            events: Arc::clone(&self.events),
        })
    }

    fn close(&mut self) -> RunResult {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        let events = self.events.lock().unwrap();
        let mut result = RunResult::default();
        for event in events.iter() {
            match event {
                Event::Succeeded(_) => result.completed += 1,
                Event::Failed(_, _) => {
                    result.completed += 1;
                    result.failures += 1;
                }
                Event::Skipped(_) => {
                    result.completed += 1;
                    result.skipped += 1;
                }
                _ => {}
            }
        }
        result
    }
}

type StartHook = Box<dyn Fn(&str) + Send + Sync>;

/// A scripted stand-in for the external test engine. Records every class it
/// actually ran; classes can be scripted to fail or to crash the engine.
pub struct ScriptedEngine {
    failing: HashSet<String>,
    erroring: HashSet<String>,
    executed: Arc<Mutex<Vec<String>>>,
    on_start: Option<StartHook>,
}

impl ScriptedEngine {
    pub fn passing() -> Self {
        Self {
            failing: HashSet::new(),
            erroring: HashSet::new(),
            executed: Arc::new(Mutex::new(Vec::new())),
            on_start: None,
        }
    }

    pub fn failing_on(mut self, names: &[&str]) -> Self {
        self.failing = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn erroring_on(mut self, names: &[&str]) -> Self {
        self.erroring = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Invoked before each class runs, with the class name. Used to inject
    /// cancellation mid-run.
    pub fn on_start(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_start = Some(Box::new(hook));
        self
    }

    pub fn executed_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.executed)
    }
}

impl TestClassRunner for ScriptedEngine {
    fn run_class(&self, class: &TestClass, _filter: &TestFilter) -> anyhow::Result<ClassOutcome> {
        if let Some(hook) = &self.on_start {
            hook(class.name());
        }
        if self.erroring.contains(class.name()) {
            anyhow::bail!("engine crashed on {}", class.name());
        }
        self.executed.lock().unwrap().push(class.name().to_string());
        if self.failing.contains(class.name()) {
            Ok(ClassOutcome::Failed {
                message: format!("{} assertions failed", class.name()),
            })
        } else {
            Ok(ClassOutcome::Passed)
        }
    }
}

pub fn scan_of(names: &[&str]) -> ScanResult {
    ScanResult::new(names.iter().map(|name| TestClass::new(*name)).collect())
}

pub fn alphabetical_order() -> Box<dyn suite_runner::core::order::RunOrderCalculator> {
    Box::new(DefaultRunOrderCalculator::new(RunOrder::Alphabetical))
}

/// A request with no suite files and the given filter specification.
pub fn scan_request(temp_dir: &TempDir, filter_spec: &str) -> TestRequest {
    TestRequest::new(
        Vec::new(),
        temp_dir.path().to_path_buf(),
        TestFilter::from_spec(filter_spec).expect("filter spec must parse"),
    )
}

/// Writes a valid suite-descriptor file and returns a request referencing it.
pub fn declared_request(temp_dir: &TempDir, filter_spec: &str) -> TestRequest {
    let suite_path = write_suite_file(
        temp_dir,
        "suite.toml",
        r#"
name = "declared"

[[test-set]]
name = "api"
classes = ["DeclaredOne", "DeclaredTwo"]
"#,
    );
    TestRequest::new(
        vec![suite_path],
        temp_dir.path().to_path_buf(),
        TestFilter::from_spec(filter_spec).expect("filter spec must parse"),
    )
}

pub fn write_suite_file(temp_dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = temp_dir.path().join(name);
    fs::write(&path, content).expect("failed to write suite file");
    path
}

/// Assembles provider parameters around a recording factory and a scripted
/// engine. The fail-fast threshold comes from `skip_after_failure_count`.
pub fn params(
    request: TestRequest,
    scan: ScanResult,
    engine: ScriptedEngine,
    factory: RecordingReporterFactory,
    reader: Option<CommandReader>,
    skip_after_failure_count: u32,
) -> ProviderParameters {
    let config = ProviderConfig {
        skip_after_failure_count,
        ..ProviderConfig::default()
    };
    ProviderParameters {
        config,
        test_request: request,
        scan_result: scan,
        run_order_calculator: alphabetical_order(),
        reporter_factory: Box::new(factory),
        engine: Box::new(engine),
        commands_reader: reader,
    }
}

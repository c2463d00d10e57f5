//! # Provider Module / Provider 模块
//!
//! The top-level orchestrator for one forked invocation. It composes the
//! filter, the run-order calculator, the plan resolver and the command
//! channel, drives execution through the external engine, and guarantees the
//! reporter factory is closed exactly once regardless of outcome.
//!
//! 单次 fork 调用的顶层编排器。它组合过滤器、运行顺序计算器、
//! 计划解析器和命令通道，通过外部引擎驱动执行，
//! 并保证无论结果如何，报告器工厂都恰好被关闭一次。

use crate::core::config::{ProviderConfig, TestRequest};
use crate::core::execution::{DirectorySuite, TestClassRunner};
use crate::core::fail_fast::FailFastEvents;
use crate::core::filter::TestFilter;
use crate::core::models::{RunResult, ScanResult, TestClass, TestSetFailure, TestsToRun};
use crate::core::order::RunOrderCalculator;
use crate::core::plan::{expand_reruns, is_declared_suite_run, DeclaredSuite};
use crate::infra::command::CommandReader;
use crate::reporting::ReporterFactory;

/// The test set a forked invocation was handed by the host. All three forms
/// of `invoke` input must be handled: absent (scan), a pre-resolved plan, or
/// a single class.
/// fork 调用从宿主得到的测试集。`invoke` 的三种输入形式都必须处理：
/// 缺失（扫描）、预先解析的计划，或单个类。
#[derive(Debug, Clone)]
pub enum ForkTestSet {
    TestsToRun(TestsToRun),
    Class(TestClass),
}

/// The collaborator bundle the host wires up before constructing a
/// [`Provider`]. The command reader is present only inside a forked worker;
/// without it, fail-fast configuration is silently inert, which is expected.
///
/// 宿主在构造 [`Provider`] 之前装配的协作者集合。
/// 命令读取器仅在 fork 出的工作进程内存在；
/// 没有它时，fail-fast 配置会静默失效，这是预期行为。
pub struct ProviderParameters {
    pub config: ProviderConfig,
    pub test_request: TestRequest,
    pub scan_result: ScanResult,
    pub run_order_calculator: Box<dyn RunOrderCalculator>,
    pub reporter_factory: Box<dyn ReporterFactory>,
    pub engine: Box<dyn TestClassRunner>,
    pub commands_reader: Option<CommandReader>,
}

/// The orchestrator. Owns the resolved plan for the duration of one
/// invocation; the cancellation listeners hold only non-owning handles to it.
pub struct Provider {
    config: ProviderConfig,
    test_request: TestRequest,
    scan_result: ScanResult,
    run_order_calculator: Box<dyn RunOrderCalculator>,
    reporter_factory: Box<dyn ReporterFactory>,
    engine: Box<dyn TestClassRunner>,
    commands_reader: Option<CommandReader>,
    tests_to_run: Option<TestsToRun>,
    rerun_all_tests_count: u32,
}

impl Provider {
    pub fn new(params: ProviderParameters) -> Self {
        let rerun_all_tests_count = params.config.rerun_all_tests_count();
        Self {
            config: params.config,
            test_request: params.test_request,
            scan_result: params.scan_result,
            run_order_calculator: params.run_order_calculator,
            reporter_factory: params.reporter_factory,
            engine: params.engine,
            commands_reader: params.commands_reader,
            tests_to_run: None,
            rerun_all_tests_count,
        }
    }

    /// Runs one invocation.
    ///
    /// Sequence: arm the skip-next listener (fail-fast + channel only), create
    /// a reporter and begin output capture, resolve the plan, register the
    /// stop listener bound to that plan, await channel readiness, execute, and
    /// finally close the reporter factory exactly once — even when resolution
    /// or execution failed — before propagating any error.
    pub async fn invoke(
        &mut self,
        fork_test_set: Option<ForkTestSet>,
    ) -> Result<RunResult, TestSetFailure> {
        if self.config.is_fail_fast() && self.commands_reader.is_some() {
            self.register_skip_next_tests_listener();
        }

        let mut reporter = self.reporter_factory.create_reporter();
        reporter.start_capture();

        let outcome = self
            .resolve_and_execute(fork_test_set, reporter.as_mut())
            .await;
        drop(reporter);
        let run_result = self.reporter_factory.close();
        outcome?;
        Ok(run_result)
    }

    async fn resolve_and_execute(
        &mut self,
        fork_test_set: Option<ForkTestSet>,
        reporter: &mut dyn crate::reporting::Reporter,
    ) -> Result<(), TestSetFailure> {
        if is_declared_suite_run(&self.test_request) {
            if let Some(reader) = &self.commands_reader {
                reader.await_started().await;
            }
            let mut suite = DeclaredSuite::new(&self.test_request, &self.config);
            suite.locate_test_sets()?;
            suite
                .execute(self.engine.as_ref(), reporter)
                .map_err(TestSetFailure::execution)?;
        } else {
            // Scanning is expensive and happens at most once per invocation:
            // a cached plan (from get_suites) or a pre-resolved fork test set
            // is reused instead of rescanning.
            let tests_to_run = match self.tests_to_run.take() {
                Some(tests) => tests,
                None => match fork_test_set {
                    Some(ForkTestSet::TestsToRun(tests)) => tests,
                    Some(ForkTestSet::Class(class)) => TestsToRun::from_class(class),
                    None => self.scan_class_path(),
                },
            };

            if let Some(reader) = &self.commands_reader {
                register_shutdown_listener(reader, &tests_to_run);
                reader.await_started().await;
            }

            let suite = self.new_directory_suite();
            let executed = suite.execute(&tests_to_run, self.engine.as_ref(), reporter);
            self.tests_to_run = Some(tests_to_run);
            executed.map_err(TestSetFailure::execution)?;
        }
        Ok(())
    }

    /// Enumerates the full list of expected test invocations for host-side
    /// bookkeeping. Empty when a declared suite governs the run; otherwise the
    /// rerun-expanded scan plan. The resolved plan is cached for `invoke`.
    pub fn get_suites(&mut self) -> Vec<TestClass> {
        if is_declared_suite_run(&self.test_request) {
            return Vec::new();
        }
        let tests_to_run = self.scan_class_path();
        let expanded = expand_reruns(tests_to_run.classes(), self.rerun_all_tests_count);
        self.tests_to_run = Some(tests_to_run);
        expanded
    }

    fn register_skip_next_tests_listener(&self) {
        if let Some(reader) = &self.commands_reader {
            reader.add_skip_next_tests_listener(Box::new(|_command| {
                FailFastEvents::global().set_skip_on_next_test();
            }));
        }
    }

    fn scan_class_path(&self) -> TestsToRun {
        // No filter at scan time; filtering happens in the engine so its own
        // grouping semantics are preserved.
        let candidates = self.scan_result.apply_filter(None);
        let ordered = self.run_order_calculator.order_test_classes(candidates);
        TestsToRun::new(ordered)
    }

    fn new_directory_suite(&self) -> DirectorySuite {
        DirectorySuite::new(
            self.test_request.test_source_directory.clone(),
            &self.config,
            self.test_filter(),
        )
    }

    /// The filter handed to execution: wildcard collapses to empty.
    fn test_filter(&self) -> TestFilter {
        self.test_request.filter.normalized()
    }
}

fn register_shutdown_listener(reader: &CommandReader, tests_to_run: &TestsToRun) {
    let tests_to_run = tests_to_run.clone();
    reader.add_shutdown_listener(Box::new(move |_command| {
        tests_to_run.mark_test_set_finished();
    }));
}

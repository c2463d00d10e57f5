//! # Test Execution Module / 测试执行模块
//!
//! The sequential execution loop for a scan-path plan, and the seam to the
//! external test engine. The loop owns the checkpoint contract: before each
//! class starts it observes the plan's finished marker, the process-wide
//! skip flag, and the local fail-fast threshold.
//!
//! 扫描路径计划的顺序执行循环，以及通向外部测试引擎的接缝。
//! 循环拥有检查点约定：在每个类开始前，
//! 它观察计划的 finished 标记、进程级跳过标志和本地 fail-fast 阈值。

use crate::core::config::ProviderConfig;
use crate::core::fail_fast::FailFastEvents;
use crate::core::filter::TestFilter;
use crate::core::models::{TestClass, TestsToRun};
use crate::reporting::Reporter;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The outcome of running one test class.
/// 运行一个测试类的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassOutcome {
    Passed,
    Failed { message: String },
    Skipped,
}

/// The external test engine: given a class (and the active name filter, whose
/// group/inclusion semantics the engine itself defines), runs it and reports
/// the outcome. An `Err` is an engine-level failure and aborts the run; the
/// reporter is still closed by the orchestrator.
///
/// 外部测试引擎：给定一个类（以及由引擎自己定义分组/包含语义的
/// 活动名称过滤器），运行它并报告结果。`Err` 是引擎级失败并中止运行；
/// 报告器仍由编排器关闭。
pub trait TestClassRunner: Send + Sync {
    fn run_class(&self, class: &TestClass, filter: &TestFilter) -> Result<ClassOutcome>;
}

/// Executes a resolved, ordered scan-path plan sequentially.
/// 顺序执行已解析的、有序的扫描路径计划。
#[derive(Debug)]
pub struct DirectorySuite {
    test_source_directory: PathBuf,
    properties: BTreeMap<String, String>,
    reports_directory: PathBuf,
    filter: TestFilter,
    cli_options: Vec<String>,
    skip_after_failure_count: u32,
}

impl DirectorySuite {
    pub fn new(
        test_source_directory: PathBuf,
        config: &ProviderConfig,
        filter: TestFilter,
    ) -> Self {
        Self {
            test_source_directory,
            properties: config.provider_properties.clone(),
            reports_directory: config.reports_directory.clone(),
            filter,
            cli_options: config.cli_options.clone(),
            skip_after_failure_count: config.skip_after_failure_count,
        }
    }

    /// The normalized name filter passed through to the engine. Empty when the
    /// configured filter was wildcard.
    pub fn filter(&self) -> &TestFilter {
        &self.filter
    }

    pub fn test_source_directory(&self) -> &PathBuf {
        &self.test_source_directory
    }

    pub fn reports_directory(&self) -> &PathBuf {
        &self.reports_directory
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn cli_options(&self) -> &[String] {
        &self.cli_options
    }

    /// Runs the plan. The finished marker is observed before each class: once
    /// set, no further class starts (classes already started have completed,
    /// since execution here is sequential). The skip flag and the fail-fast
    /// threshold instead report each remaining class as skipped.
    pub fn execute(
        &self,
        tests_to_run: &TestsToRun,
        engine: &dyn TestClassRunner,
        reporter: &mut dyn Reporter,
    ) -> Result<()> {
        reporter.test_set_starting("classpath-scan");

        let mut failures = 0u32;
        for class in tests_to_run.iter() {
            if tests_to_run.is_finished() {
                break;
            }
            run_single_class(
                class,
                &self.filter,
                engine,
                reporter,
                &mut failures,
                self.skip_after_failure_count,
            )?;
        }

        reporter.test_set_completed("classpath-scan");
        Ok(())
    }
}

/// One checkpointed step of the execution loop: report the class as skipped if
/// the process-wide skip flag is set or the fail-fast threshold was reached,
/// otherwise hand it to the engine and report the outcome.
pub(crate) fn run_single_class(
    class: &TestClass,
    filter: &TestFilter,
    engine: &dyn TestClassRunner,
    reporter: &mut dyn Reporter,
    failures: &mut u32,
    skip_after_failure_count: u32,
) -> Result<()> {
    let threshold_reached = skip_after_failure_count > 0 && *failures >= skip_after_failure_count;
    if FailFastEvents::global().is_skip_on_next_test() || threshold_reached {
        reporter.test_skipped(class);
        return Ok(());
    }

    reporter.test_starting(class);
    let outcome = engine
        .run_class(class, filter)
        .with_context(|| format!("engine failed while running '{class}'"))?;
    match outcome {
        ClassOutcome::Passed => reporter.test_succeeded(class),
        ClassOutcome::Failed { message } => {
            *failures += 1;
            reporter.test_failed(class, &message);
        }
        ClassOutcome::Skipped => reporter.test_skipped(class),
    }
    Ok(())
}

//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures used throughout the suite
//! runner: test-class identifiers, the scanned candidate set, the resolved
//! scan-path plan, the final run result and the failure taxonomy.
//!
//! 此模块定义了整个套件运行器中使用的核心数据结构：
//! 测试类标识符、扫描到的候选集、解析后的扫描路径计划、
//! 最终运行结果和失败分类。

use crate::core::filter::TestFilter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Identifies a single discoverable test class.
/// 标识一个可发现的测试类。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestClass {
    name: String,
}

impl TestClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The (possibly fully qualified) class name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TestClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The unordered candidate set produced by the host's classpath scanner.
/// Scanning mechanics are a host concern; the orchestrator only consumes
/// the result. Immutable once produced.
///
/// 由宿主的类路径扫描器产生的无序候选集。
/// 扫描机制是宿主的职责；编排器只消费其结果。产生后不可变。
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    classes: Vec<TestClass>,
}

impl ScanResult {
    pub fn new(classes: Vec<TestClass>) -> Self {
        Self { classes }
    }

    /// Returns the candidate classes, optionally narrowed by a class-level
    /// name filter. The orchestrator passes `None` here: filtering is the
    /// execution engine's concern so that its own grouping/inclusion
    /// semantics are preserved.
    pub fn apply_filter(&self, filter: Option<&TestFilter>) -> Vec<TestClass> {
        match filter {
            None => self.classes.clone(),
            Some(filter) => self
                .classes
                .iter()
                .filter(|class| filter.matches(class.name(), None))
                .cloned()
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// The resolved, ordered scan-path plan for one invocation.
///
/// The class sequence is never reordered after creation. The only mutation is
/// the shared "finished" marker: set (at most once effectively) by the
/// cancellation listener and observed by the execution loop before each class
/// starts. Clones share the marker, so a clone held by a listener closure can
/// stop the plan owned by the orchestrator.
///
/// 一次调用中已解析的、有序的扫描路径计划。
///
/// 类序列在创建后不会被重新排序。唯一的可变状态是共享的 "finished" 标记：
/// 由取消监听器设置（实际上至多一次），并在每个类开始前被执行循环观察。
/// 克隆共享该标记，因此监听器闭包持有的克隆可以停止编排器持有的计划。
#[derive(Debug, Clone)]
pub struct TestsToRun {
    classes: Arc<Vec<TestClass>>,
    finished: Arc<AtomicBool>,
}

impl TestsToRun {
    pub fn new(classes: Vec<TestClass>) -> Self {
        Self {
            classes: Arc::new(classes),
            finished: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Builds a single-class plan, used when the host forks one class at a time.
    pub fn from_class(class: TestClass) -> Self {
        Self::new(vec![class])
    }

    pub fn classes(&self) -> &[TestClass] {
        &self.classes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TestClass> {
        self.classes.iter()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Marks the remaining work of this plan as finished. Idempotent; the
    /// marker is never cleared during an invocation. Classes already started
    /// run to completion, classes not yet started will not start.
    pub fn mark_test_set_finished(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }

    /// Checkpoint read performed before each class starts.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

/// The final result of one invocation, returned to the host.
/// `completed` counts every class that was reported (passed, failed or
/// skipped); `skipped` and `failures` break that total down.
///
/// 一次调用的最终结果，返回给宿主。
/// `completed` 统计所有被报告的类（通过、失败或跳过）；
/// `skipped` 和 `failures` 是该总数的细分。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub completed: usize,
    pub errors: usize,
    pub failures: usize,
    pub skipped: usize,
}

impl RunResult {
    pub fn new(completed: usize, errors: usize, failures: usize, skipped: usize) -> Self {
        Self {
            completed,
            errors,
            failures,
            skipped,
        }
    }

    pub fn is_error_free(&self) -> bool {
        self.errors == 0 && self.failures == 0
    }

    /// Merges the counters of two results, e.g. across repeated invocations
    /// driven by the host.
    pub fn aggregate(&self, other: &RunResult) -> RunResult {
        RunResult {
            completed: self.completed + other.completed,
            errors: self.errors + other.errors,
            failures: self.failures + other.failures,
            skipped: self.skipped + other.skipped,
        }
    }
}

/// Why an invocation failed. Configuration failures (malformed suite
/// descriptor, missing source root) are fatal and not retried; execution
/// failures come from the test engine. An absent command channel is not an
/// error at all, it merely disables cancellation.
///
/// 一次调用失败的原因。配置失败（套件描述文件格式错误、缺少源根目录）
/// 是致命的且不会重试；执行失败来自测试引擎。
/// 命令通道缺失完全不是错误，它只是禁用了取消功能。
#[derive(Debug)]
pub enum TestSetFailure {
    Configuration(anyhow::Error),
    Execution(anyhow::Error),
}

impl TestSetFailure {
    pub fn configuration(err: impl Into<anyhow::Error>) -> Self {
        TestSetFailure::Configuration(err.into())
    }

    pub fn execution(err: impl Into<anyhow::Error>) -> Self {
        TestSetFailure::Execution(err.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, TestSetFailure::Configuration(_))
    }
}

impl fmt::Display for TestSetFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestSetFailure::Configuration(err) => {
                write!(f, "suite configuration failure: {err:#}")
            }
            TestSetFailure::Execution(err) => write!(f, "test execution failure: {err:#}"),
        }
    }
}

impl std::error::Error for TestSetFailure {}

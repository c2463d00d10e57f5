//! # Reporting Module / 报告模块
//!
//! The reporter seam the orchestration core emits events through, and a
//! default colored-console implementation. Report aggregation/persistence
//! beyond the final [`RunResult`](crate::core::models::RunResult) is a host
//! concern.
//!
//! 编排核心用来发送事件的报告接缝，以及默认的彩色控制台实现。
//! 除最终 [`RunResult`](crate::core::models::RunResult) 之外的
//! 报告聚合/持久化是宿主的职责。

pub mod console;

use crate::core::models::{RunResult, TestClass};

/// Receives execution events for one invocation. Implementations must not
/// assume any parallelism: events arrive from the single execution task in
/// plan order.
///
/// 接收一次调用的执行事件。实现不得假设任何并行性：
/// 事件按计划顺序从单个执行任务到达。
pub trait Reporter: Send {
    /// Signals that console/output capture should begin, bound to this
    /// reporter. Called once, before plan resolution. The capture plumbing
    /// itself lives outside the orchestration core.
    fn start_capture(&mut self);

    fn test_set_starting(&mut self, name: &str);

    fn test_starting(&mut self, class: &TestClass);

    fn test_succeeded(&mut self, class: &TestClass);

    fn test_failed(&mut self, class: &TestClass, message: &str);

    fn test_skipped(&mut self, class: &TestClass);

    fn test_set_completed(&mut self, name: &str);
}

/// Creates reporters and, once closed, yields the final run result.
/// `close` must be called exactly once per invocation; the orchestrator
/// guarantees this even when plan resolution or execution fails.
///
/// 创建报告器，并在关闭后产出最终运行结果。
/// `close` 每次调用必须且只能被调用一次；
/// 即使计划解析或执行失败，编排器也保证这一点。
pub trait ReporterFactory: Send {
    fn create_reporter(&mut self) -> Box<dyn Reporter>;

    fn close(&mut self) -> RunResult;
}

// Re-export the default implementation
pub use console::{ConsoleReporter, ConsoleReporterFactory};

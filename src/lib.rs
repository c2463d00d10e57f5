//! # Suite Runner Library / Suite Runner 库
//!
//! This library provides the orchestration core for a forked test run:
//! it resolves an execution plan (declared suite files or a classpath scan),
//! applies name filters and a run-order strategy, expands the plan for
//! rerun enumeration, and reacts to asynchronous stop/skip commands.
//!
//! 此库为 fork 出的测试运行提供编排核心：
//! 它解析执行计划（声明的套件文件或类路径扫描），
//! 应用名称过滤器和运行顺序策略，为重跑枚举展开计划，
//! 并响应异步的停止/跳过命令。
//!
//! ## Modules / 模块
//!
//! - `core` - Plan resolution, filtering, ordering and the orchestrator
//! - `infra` - Infrastructure services like the asynchronous command channel
//! - `reporting` - Reporter seam and console reporting
//!
//! - `core` - 计划解析、过滤、排序和编排器
//! - `infra` - 基础设施服务，如异步命令通道
//! - `reporting` - 报告接口和控制台报告

pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use core::config::{ProviderConfig, TestRequest};
pub use core::execution::{ClassOutcome, DirectorySuite, TestClassRunner};
pub use core::filter::TestFilter;
pub use core::models::{RunResult, ScanResult, TestClass, TestSetFailure, TestsToRun};
pub use core::order::{DefaultRunOrderCalculator, RunOrder, RunOrderCalculator};
pub use core::provider::{ForkTestSet, Provider, ProviderParameters};
pub use infra::command::{command_channel, Command, CommandReader, CommandSender};
pub use reporting::{Reporter, ReporterFactory};

//! # Core Module / 核心模块
//!
//! This module contains the core functionality of Suite Runner,
//! including the data model, plan resolution and the orchestrator.
//!
//! 此模块包含 Suite Runner 的核心功能，
//! 包括数据模型、计划解析和编排器。

pub mod config;
pub mod execution;
pub mod fail_fast;
pub mod filter;
pub mod models;
pub mod order;
pub mod plan;
pub mod provider;

// Re-exports
pub use models::{RunResult, TestsToRun};
pub use plan::expand_reruns;
pub use provider::Provider;

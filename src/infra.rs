//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for Suite Runner,
//! currently the asynchronous command channel used by forked workers.
//!
//! 此模块为 Suite Runner 提供基础设施服务，
//! 目前是 fork 出的工作进程使用的异步命令通道。

pub mod command;

//! # Run Order Module / 运行顺序模块
//!
//! Turns the unordered candidate set into a deterministic execution order.
//! The calculator is a seam: hosts may supply their own implementation, and
//! `DefaultRunOrderCalculator` covers the built-in strategies.
//!
//! 将无序的候选集转换为确定性的执行顺序。
//! 计算器是一个接缝：宿主可以提供自己的实现，
//! `DefaultRunOrderCalculator` 覆盖内置策略。

use crate::core::models::TestClass;
use anyhow::{bail, Result};
use chrono::Timelike;

/// The built-in ordering strategies.
/// 内置的排序策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOrder {
    /// Ascending by class name.
    Alphabetical,
    /// Descending by class name.
    ReverseAlphabetical,
    /// Shuffled; a fixed seed reproduces the same order across runs.
    Random { seed: Option<u64> },
    /// Alphabetical on even hours, reversed on odd hours.
    Hourly,
    /// Keep the order in which candidates were discovered.
    Filesystem,
}

impl RunOrder {
    /// Parses the configuration string form, e.g. `"alphabetical"` or
    /// `"random"`.
    pub fn from_spec(spec: &str) -> Result<Self> {
        match spec.trim().to_ascii_lowercase().as_str() {
            "alphabetical" => Ok(RunOrder::Alphabetical),
            "reversealphabetical" => Ok(RunOrder::ReverseAlphabetical),
            "random" => Ok(RunOrder::Random { seed: None }),
            "hourly" => Ok(RunOrder::Hourly),
            "filesystem" => Ok(RunOrder::Filesystem),
            other => bail!("unknown run order '{other}'"),
        }
    }
}

impl Default for RunOrder {
    fn default() -> Self {
        RunOrder::Filesystem
    }
}

/// Orders candidate test classes for execution. The returned sequence must be
/// deterministic for a given strategy and candidate set (random ordering is
/// deterministic once a seed is fixed).
///
/// 为执行排序候选测试类。对于给定的策略和候选集，
/// 返回的序列必须是确定性的（随机排序在种子固定后也是确定性的）。
pub trait RunOrderCalculator: Send + Sync {
    fn order_test_classes(&self, candidates: Vec<TestClass>) -> Vec<TestClass>;
}

/// Applies a [`RunOrder`] strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRunOrderCalculator {
    order: RunOrder,
}

impl DefaultRunOrderCalculator {
    pub fn new(order: RunOrder) -> Self {
        Self { order }
    }
}

impl RunOrderCalculator for DefaultRunOrderCalculator {
    fn order_test_classes(&self, mut candidates: Vec<TestClass>) -> Vec<TestClass> {
        match self.order {
            RunOrder::Alphabetical => {
                candidates.sort_by(|a, b| a.name().cmp(b.name()));
            }
            RunOrder::ReverseAlphabetical => {
                candidates.sort_by(|a, b| b.name().cmp(a.name()));
            }
            RunOrder::Random { seed } => {
                let mut rng = match seed {
                    Some(seed) => fastrand::Rng::with_seed(seed),
                    None => fastrand::Rng::new(),
                };
                rng.shuffle(&mut candidates);
            }
            RunOrder::Hourly => {
                candidates.sort_by(|a, b| a.name().cmp(b.name()));
                if chrono::Local::now().hour() % 2 == 1 {
                    candidates.reverse();
                }
            }
            RunOrder::Filesystem => {}
        }
        candidates
    }
}

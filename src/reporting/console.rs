//! # Console Reporting Module / 控制台报告模块
//!
//! A colored-console [`Reporter`]/[`ReporterFactory`] pair. Every reporter
//! created by one factory feeds the same counters, and closing the factory
//! prints a summary and yields the aggregated [`RunResult`].
//!
//! 彩色控制台的 [`Reporter`]/[`ReporterFactory`] 实现。
//! 同一工厂创建的所有报告器共享同一组计数器，
//! 关闭工厂会打印摘要并产出聚合的 [`RunResult`]。

use crate::core::models::{RunResult, TestClass};
use crate::reporting::{Reporter, ReporterFactory};
use chrono::{DateTime, Local};
use colored::*;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct RunStats {
    completed: usize,
    errors: usize,
    failures: usize,
    skipped: usize,
}

impl RunStats {
    fn as_run_result(&self) -> RunResult {
        RunResult::new(self.completed, self.errors, self.failures, self.skipped)
    }
}

/// Prints one line per event and feeds the shared counters.
pub struct ConsoleReporter {
    stats: Arc<Mutex<RunStats>>,
}

impl Reporter for ConsoleReporter {
    fn start_capture(&mut self) {
        println!("{}", "Capturing test output...".dimmed());
    }

    fn test_set_starting(&mut self, name: &str) {
        println!("{}", format!("Running test set '{name}'").bold());
    }

    fn test_starting(&mut self, class: &TestClass) {
        println!("{}", format!("  Running {class}...").blue());
    }

    fn test_succeeded(&mut self, class: &TestClass) {
        println!("{}", format!("  PASS {class}").green());
        if let Ok(mut stats) = self.stats.lock() {
            stats.completed += 1;
        }
    }

    fn test_failed(&mut self, class: &TestClass, message: &str) {
        println!("{}", format!("  FAIL {class}: {message}").red());
        if let Ok(mut stats) = self.stats.lock() {
            stats.completed += 1;
            stats.failures += 1;
        }
    }

    fn test_skipped(&mut self, class: &TestClass) {
        println!("{}", format!("  SKIP {class}").yellow());
        if let Ok(mut stats) = self.stats.lock() {
            stats.completed += 1;
            stats.skipped += 1;
        }
    }

    fn test_set_completed(&mut self, name: &str) {
        println!("{}", format!("Test set '{name}' completed").bold());
    }
}

/// The factory half: create any number of console reporters, close once.
pub struct ConsoleReporterFactory {
    stats: Arc<Mutex<RunStats>>,
    started_at: DateTime<Local>,
    closed: bool,
}

impl ConsoleReporterFactory {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(Mutex::new(RunStats::default())),
            started_at: Local::now(),
            closed: false,
        }
    }
}

impl Default for ConsoleReporterFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ReporterFactory for ConsoleReporterFactory {
    fn create_reporter(&mut self) -> Box<dyn Reporter> {
        Box::new(ConsoleReporter {
            stats: Arc::clone(&self.stats),
        })
    }

    fn close(&mut self) -> RunResult {
        let result = self
            .stats
            .lock()
            .map(|stats| stats.as_run_result())
            .unwrap_or_default();

        // The summary is printed once; a repeated close only returns the
        // already-aggregated counters.
        if !self.closed {
            self.closed = true;
            let elapsed = Local::now() - self.started_at;
            println!(
                "\n{} {} run, {} failures, {} skipped ({}.{:03}s)",
                "Summary:".bold(),
                result.completed,
                result.failures,
                result.skipped,
                elapsed.num_seconds(),
                elapsed.num_milliseconds().rem_euclid(1000),
            );
            if result.is_error_free() {
                println!("{}", "All tests passed".green().bold());
            } else {
                println!("{}", "Run finished with failures".red().bold());
            }
        }
        result
    }
}

//! # Fail-Fast Events Module / Fail-Fast 事件模块
//!
//! The process-wide skip-on-next-test flag shared between the command-channel
//! listener task and the execution loop. The flag is set at most once per run
//! and never auto-cleared; only the host resets it at run boundaries.
//!
//! 进程级的 skip-on-next-test 标志，在命令通道监听任务和执行循环之间共享。
//! 该标志每次运行至多设置一次且不会自动清除；只有宿主在运行边界重置它。

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, Ordering};

static EVENTS: Lazy<FailFastEvents> = Lazy::new(FailFastEvents::new);

/// A single atomic flag with a checkpoint contract: the listener task sets it,
/// the execution loop reads it before starting each test class.
/// 带检查点约定的单个原子标志：监听任务设置它，
/// 执行循环在每个测试类开始前读取它。
#[derive(Debug)]
pub struct FailFastEvents {
    skip_on_next_test: AtomicBool,
}

impl FailFastEvents {
    fn new() -> Self {
        Self {
            skip_on_next_test: AtomicBool::new(false),
        }
    }

    /// The process-wide instance.
    pub fn global() -> &'static FailFastEvents {
        &EVENTS
    }

    /// Requests that every test class not yet started be skipped. Idempotent;
    /// the effect persists for the remainder of the run.
    pub fn set_skip_on_next_test(&self) {
        self.skip_on_next_test.store(true, Ordering::SeqCst);
    }

    /// Checkpoint read performed before each test class starts.
    pub fn is_skip_on_next_test(&self) -> bool {
        self.skip_on_next_test.load(Ordering::SeqCst)
    }

    /// Clears the flag. The lifecycle of the flag is owned by the host: this
    /// is called only at process/run boundaries, never mid-run.
    pub fn reset(&self) {
        self.skip_on_next_test.store(false, Ordering::SeqCst);
    }
}

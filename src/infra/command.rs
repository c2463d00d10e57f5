//! # Command Channel Module / 命令通道模块
//!
//! The asynchronous control channel between the host and a forked worker.
//! A dispatch task delivers commands to registered listeners in order;
//! commands observed before a listener registers are replayed to it at
//! registration, so a signal sent immediately after fork is never lost.
//!
//! 宿主与 fork 出的工作进程之间的异步控制通道。
//! 调度任务按顺序将命令投递给已注册的监听器；
//! 在监听器注册之前观察到的命令会在注册时向其重放，
//! 因此 fork 之后立即发送的信号不会丢失。

use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;

/// A control command delivered out-of-band while tests are running.
/// 测试运行期间带外投递的控制命令。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Keep-alive / readiness probe; carries no effect.
    Noop,
    /// Mark the current plan's remaining work as finished.
    Shutdown,
    /// Skip every test class not yet started.
    SkipNextTests,
}

/// A registered command callback. Callbacks run on the dispatch task and must
/// confine themselves to setting write-once state (atomic flags, markers).
pub type CommandListener = Box<dyn Fn(&Command) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    shutdown: Mutex<Vec<CommandListener>>,
    skip_next: Mutex<Vec<CommandListener>>,
    // Sticky delivery flags: a late-registered listener is replayed the
    // command kind that already arrived.
    shutdown_seen: AtomicBool,
    skip_next_seen: AtomicBool,
}

/// The host-side handle used to send commands into the worker.
/// 宿主侧句柄，用于向工作进程发送命令。
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: mpsc::UnboundedSender<Command>,
}

impl CommandSender {
    /// Sends a command. Returns `false` when the reader side is gone.
    pub fn send(&self, command: Command) -> bool {
        self.tx.send(command).is_ok()
    }
}

/// The worker-side reader. Present only inside a forked worker; when the host
/// runs in-process the orchestrator simply has no reader and all cancellation
/// logic is inert.
///
/// 工作进程侧的读取器。仅在 fork 出的工作进程中存在；
/// 当宿主在进程内运行时，编排器没有读取器，所有取消逻辑都处于惰性状态。
pub struct CommandReader {
    listeners: Arc<Listeners>,
    started: watch::Receiver<bool>,
    cancel: CancellationToken,
}

impl CommandReader {
    /// Blocks until the dispatch task is live. Callers register their
    /// listeners first, then await this; together with sticky replay this
    /// closes the race where a command sent immediately after fork would be
    /// missed.
    pub async fn await_started(&self) {
        let mut started = self.started.clone();
        // The sender half lives as long as the dispatch task; an error here
        // means the task exited, which also counts as "started".
        let _ = started.wait_for(|live| *live).await;
    }

    /// Registers a listener for [`Command::Shutdown`]. Replayed immediately if
    /// a shutdown command was already delivered.
    pub fn add_shutdown_listener(&self, listener: CommandListener) {
        if self.listeners.shutdown_seen.load(Ordering::SeqCst) {
            listener(&Command::Shutdown);
        }
        if let Ok(mut listeners) = self.listeners.shutdown.lock() {
            listeners.push(listener);
        }
    }

    /// Registers a listener for [`Command::SkipNextTests`]. Replayed
    /// immediately if a skip command was already delivered.
    pub fn add_skip_next_tests_listener(&self, listener: CommandListener) {
        if self.listeners.skip_next_seen.load(Ordering::SeqCst) {
            listener(&Command::SkipNextTests);
        }
        if let Ok(mut listeners) = self.listeners.skip_next.lock() {
            listeners.push(listener);
        }
    }
}

impl Drop for CommandReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for CommandReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandReader")
            .field("started", &*self.started.borrow())
            .finish_non_exhaustive()
    }
}

/// Creates a connected sender/reader pair and spawns the dispatch task on the
/// current tokio runtime.
pub fn command_channel() -> (CommandSender, CommandReader) {
    let (tx, rx) = mpsc::unbounded_channel();
    let (started_tx, started_rx) = watch::channel(false);
    let listeners = Arc::new(Listeners::default());
    let cancel = CancellationToken::new();

    tokio::spawn(dispatch(
        rx,
        Arc::clone(&listeners),
        started_tx,
        cancel.clone(),
    ));

    (
        CommandSender { tx },
        CommandReader {
            listeners,
            started: started_rx,
            cancel,
        },
    )
}

/// Single consumer task: commands are observed in delivery order. Exits when
/// the sender is dropped or the reader cancels it.
async fn dispatch(
    rx: mpsc::UnboundedReceiver<Command>,
    listeners: Arc<Listeners>,
    started_tx: watch::Sender<bool>,
    cancel: CancellationToken,
) {
    let mut commands = UnboundedReceiverStream::new(rx);
    let _ = started_tx.send(true);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            command = commands.next() => match command {
                Some(command) => dispatch_one(&listeners, command),
                None => break,
            },
        }
    }
}

fn dispatch_one(listeners: &Listeners, command: Command) {
    match command {
        Command::Shutdown => {
            listeners.shutdown_seen.store(true, Ordering::SeqCst);
            if let Ok(registered) = listeners.shutdown.lock() {
                for listener in registered.iter() {
                    listener(&command);
                }
            }
        }
        Command::SkipNextTests => {
            listeners.skip_next_seen.store(true, Ordering::SeqCst);
            if let Ok(registered) = listeners.skip_next.lock() {
                for listener in registered.iter() {
                    listener(&command);
                }
            }
        }
        Command::Noop => {}
    }
}

//! # Shared control skeleton for all task variants.
//!
//! [`TaskCore`] owns everything both variants have in common: the status
//! machine, the three gates (pause, stop, done), the worker thread
//! handle, the registry membership, and the error-routing path. The
//! variants supply only their run strategy (the closure handed to
//! [`start_worker`]), which is wrapped with panic capture and a
//! drop-guard so that no exit path, however abrupt, leaves the status
//! stuck at `Running`, the registry entry dangling, or the done latch
//! closed.
//!
//! ## Stop protocol
//! ```text
//! stop(force, timeout)
//!   ├─► already terminal?  ─► return true (idempotent no-op)
//!   ├─► status ← Stopping
//!   ├─► open stop latch    (worker exits at next loop-top / sleep)
//!   ├─► open pause gate    (a paused worker must not deadlock)
//!   ├─► wait done latch, bounded by timeout
//!   │     ├─ opened ─► reap thread handle
//!   │     └─ timed out
//!   │          ├─ force ─► kill::terminate, detach handle
//!   │          └─ else  ─► warn, leave worker to exit on its own
//!   ├─► status ← Stopped   (refused if the worker already sealed a
//!   │                       terminal status such as Error)
//!   └─► deregister
//! ```
//!
//! ## Locking
//! Status lives under one mutex per task; the registry map under its
//! own. No path takes the registry lock while holding a status lock in a
//! way that can cycle: registration happens before any worker exists,
//! and `stop_all` snapshots the registry before stopping anything.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::TaskConfig;
use crate::core::gate::{Gate, StopToken};
use crate::core::kill;
use crate::core::Registry;
use crate::error::{ControlError, TaskError};
use crate::tasks::status::TaskStatus;
use crate::tasks::task::{Task, TaskRef};

pub(crate) type ErrorHandler = Box<dyn Fn(&TaskError) + Send + Sync>;

/// Sealed accessor connecting a task variant to its control core.
///
/// Implemented by the variant inners; not nameable outside the crate, so
/// [`Task`](crate::Task) cannot be implemented externally.
pub trait AsCore {
    #[doc(hidden)]
    fn core(&self) -> &TaskCore;
}

/// Control state shared by every task variant.
pub struct TaskCore {
    name: Arc<str>,
    cfg: TaskConfig,
    registry: Arc<Registry>,
    handler: Option<ErrorHandler>,

    status: Mutex<TaskStatus>,
    started: AtomicBool,
    faulted: AtomicBool,

    /// Closed = suspended; the worker waits on it between units of work.
    pause: Gate,
    /// Open = stop requested; doubles as the interruptible interval sleep.
    stop: Arc<Gate>,
    /// Opens exactly once when the worker exits (or is given up on).
    done: Gate,

    worker: Mutex<Option<JoinHandle<()>>>,
    /// Weak self-reference, set at start; used so terminal cleanup only
    /// ever removes this task's own registry entry.
    this: Mutex<Option<Weak<dyn Task>>>,
}

impl TaskCore {
    pub(crate) fn new(
        name: String,
        cfg: TaskConfig,
        registry: Arc<Registry>,
        handler: Option<ErrorHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            cfg,
            registry,
            handler,
            status: Mutex::new(TaskStatus::Created),
            started: AtomicBool::new(false),
            faulted: AtomicBool::new(false),
            pause: Gate::new(true),
            stop: Arc::new(Gate::new(false)),
            done: Gate::new(false),
            worker: Mutex::new(None),
            this: Mutex::new(None),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn config(&self) -> &TaskConfig {
        &self.cfg
    }

    pub(crate) fn status(&self) -> TaskStatus {
        *self.status.lock()
    }

    pub(crate) fn started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.started() && !self.done.is_open()
    }

    pub(crate) fn stop_token(&self) -> StopToken {
        StopToken::new(self.stop.clone())
    }

    pub(crate) fn stop_requested(&self) -> bool {
        self.stop.is_open()
    }

    /// Blocks the worker while the pause gate is closed.
    pub(crate) fn pause_point(&self) {
        self.pause.wait();
    }

    /// Sleeps up to `delay` on the stop latch; true = stop requested.
    pub(crate) fn stop_wait(&self, delay: Duration) -> bool {
        self.stop.wait_for(delay)
    }

    pub(crate) fn done_wait(&self) {
        self.done.wait();
    }

    pub(crate) fn done_wait_for(&self, timeout: Duration) -> bool {
        self.done.wait_for(timeout)
    }

    pub(crate) fn is_done(&self) -> bool {
        self.done.is_open()
    }

    /// Moves the status machine, refusing to leave a terminal state.
    pub(crate) fn transition(&self, to: TaskStatus) -> bool {
        let mut status = self.status.lock();
        if status.is_terminal() {
            tracing::debug!(
                task = %self.name,
                from = status.as_label(),
                to = to.as_label(),
                "transition refused: status is terminal"
            );
            return false;
        }
        tracing::debug!(
            task = %self.name,
            from = status.as_label(),
            to = to.as_label(),
            "status transition"
        );
        *status = to;
        true
    }

    /// Closes the pause gate. Valid only from `Running`; otherwise a
    /// logged no-op.
    pub(crate) fn pause(&self) -> bool {
        let mut status = self.status.lock();
        if *status != TaskStatus::Running {
            tracing::warn!(
                task = %self.name,
                status = status.as_label(),
                "cannot pause task that is not running"
            );
            return false;
        }
        *status = TaskStatus::Paused;
        // Gate flip stays under the status lock so a racing resume
        // cannot leave the status and the gate disagreeing.
        self.pause.close();
        tracing::debug!(task = %self.name, "paused");
        true
    }

    /// Reopens the pause gate. Valid only from `Paused`; otherwise a
    /// logged no-op.
    pub(crate) fn resume(&self) -> bool {
        let mut status = self.status.lock();
        if *status != TaskStatus::Paused {
            tracing::warn!(
                task = %self.name,
                status = status.as_label(),
                "cannot resume task that is not paused"
            );
            return false;
        }
        *status = TaskStatus::Running;
        self.pause.open();
        tracing::debug!(task = %self.name, "resumed");
        true
    }

    /// Graceful-then-forced stop; see the module docs for the protocol.
    ///
    /// Returns whether the worker is known to have ended. `false` means
    /// the graceful bound elapsed and the worker is either detached
    /// after a forced-kill attempt or still draining on its own.
    pub(crate) fn stop(&self, force: bool, timeout: Duration) -> bool {
        if self.status().is_terminal() {
            return true;
        }
        self.transition(TaskStatus::Stopping);
        self.stop.open();
        self.pause.open();

        let mut ended = true;
        if self.started() {
            ended = self.done.wait_for(timeout);
            if ended {
                self.reap();
            } else if force {
                tracing::warn!(task = %self.name, "graceful stop timed out; forcing termination");
                if let Some(handle) = self.worker.lock().take() {
                    // After a kill attempt the handle must not be joined:
                    // the worker may never signal. Dropping it detaches.
                    kill::terminate(&handle, &self.name);
                }
            } else {
                tracing::warn!(
                    task = %self.name,
                    timeout = ?timeout,
                    "graceful stop timed out; worker left to exit on its own"
                );
            }
        }

        self.transition(TaskStatus::Stopped);
        self.deregister();
        if ended || force {
            self.done.open();
        }
        ended
    }

    /// Waits for the worker to end, optionally bounded. Never changes
    /// status.
    pub(crate) fn join(&self, timeout: Option<Duration>) -> bool {
        if !self.started() {
            return true;
        }
        let ended = match timeout {
            Some(bound) => self.done.wait_for(bound),
            None => {
                self.done.wait();
                true
            }
        };
        if ended {
            self.reap();
        }
        ended
    }

    /// Routes a user-function error: log, mark the fault, invoke the
    /// optional handler (its panics are caught and logged, never
    /// propagated), and report whether stop-on-error escalates.
    pub(crate) fn route_error(&self, error: &TaskError) -> bool {
        self.faulted.store(true, Ordering::SeqCst);
        tracing::error!(task = %self.name, kind = error.as_label(), "{}", error.as_message());
        if let Some(handler) = &self.handler {
            if panic::catch_unwind(AssertUnwindSafe(|| handler(error))).is_err() {
                tracing::error!(task = %self.name, "error handler panicked");
            }
        }
        self.cfg.stop_on_error
    }

    fn is_faulted(&self) -> bool {
        self.faulted.load(Ordering::SeqCst)
    }

    /// Seals a terminal status, removes the registry entry, and opens
    /// the done latch. Safe to call more than once; later calls are
    /// no-ops.
    fn finalize(&self, terminal: TaskStatus) {
        self.transition(terminal);
        self.deregister();
        self.done.open();
    }

    fn deregister(&self) {
        let this = self.this.lock().clone();
        if let Some(weak) = this {
            self.registry.unregister_entry(&self.name, &weak);
        }
    }

    fn reap(&self) {
        if let Some(handle) = self.worker.lock().take() {
            let _ = handle.join();
        }
    }
}

/// Shared `start` implementation: start-once guard, registration,
/// thread spawn, rollback.
///
/// Registration precedes the spawn, so a duplicate name fails `start`
/// cleanly: the start-once flag is rolled back and the task stays
/// `Created`, retryable once the name frees up. A spawn failure after
/// successful registration is fatal: the task is deregistered and left
/// in `Error`.
pub(crate) fn start_worker<F>(task: TaskRef, strategy: F) -> Result<(), ControlError>
where
    F: FnOnce() -> TaskStatus + Send + 'static,
{
    let core = task.core();
    let name = core.name().to_string();

    if core.status().is_terminal() || core.started.swap(true, Ordering::SeqCst) {
        return Err(ControlError::AlreadyStarted { name });
    }

    *core.this.lock() = Some(Arc::downgrade(&task));
    if let Err(err) = core.registry.register(&task) {
        core.started.store(false, Ordering::SeqCst);
        return Err(err);
    }

    core.transition(TaskStatus::Running);
    let worker = task.clone();
    let spawned = thread::Builder::new()
        .name(name.clone())
        .spawn(move || worker_main(worker, strategy));

    match spawned {
        Ok(handle) => {
            *core.worker.lock() = Some(handle);
            Ok(())
        }
        Err(source) => {
            core.deregister();
            core.transition(TaskStatus::Error);
            core.done.open();
            Err(ControlError::Spawn { name, source })
        }
    }
}

/// Worker entry point: runs the variant's strategy under a guard that
/// finalizes on every exit path.
fn worker_main<F>(task: TaskRef, strategy: F)
where
    F: FnOnce() -> TaskStatus,
{
    let guard = FinishGuard { task };
    let terminal = strategy();
    guard.task.core().finalize(terminal);
    // The guard's own drop re-runs finalize as a no-op.
}

/// Backstop for strategies that unwind instead of returning a terminal
/// status: seals `Error` when a fault was recorded, `Stopped` otherwise.
struct FinishGuard {
    task: TaskRef,
}

impl Drop for FinishGuard {
    fn drop(&mut self) {
        let core = self.task.core();
        let fallback = if core.is_faulted() {
            TaskStatus::Error
        } else {
            TaskStatus::Stopped
        };
        core.finalize(fallback);
    }
}

/// Renders a caught panic payload as text for [`TaskError::Panic`].
pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "opaque panic payload".to_string()
    }
}

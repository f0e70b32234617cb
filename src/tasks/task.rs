//! # The shared control surface of every task.
//!
//! [`Task`] is the object-safe contract implemented by both variants;
//! [`TaskRef`] (`Arc<dyn Task>`) is the handle type the
//! [`Registry`](crate::Registry) stores (weakly) and returns. All
//! methods are provided as default implementations over the sealed
//! control core, so the two variants differ only in their run strategy.
//!
//! The trait is sealed: it cannot be implemented outside this crate.

use std::time::Duration;

use crate::tasks::base::AsCore;
use crate::tasks::status::TaskStatus;

/// Shared handle to a task object.
///
/// This is the type returned by registry lookups; it exposes the control
/// surface but not the typed outcome (use the concrete
/// [`RepeatingTask`](crate::RepeatingTask) / [`OnceTask`](crate::OnceTask)
/// handle for that).
pub type TaskRef = std::sync::Arc<dyn Task>;

/// # Control surface shared by repeating and one-shot tasks.
///
/// A task wraps one user function and one dedicated native thread. The
/// controller side (everything on this trait) only ever touches shared
/// control primitives; it never preempts an in-flight invocation of the
/// user function.
pub trait Task: AsCore + Send + Sync {
    /// Stable task name, unique within its registry while alive.
    fn name(&self) -> &str {
        self.core().name()
    }

    /// Current lifecycle status.
    fn status(&self) -> TaskStatus {
        self.core().status()
    }

    /// True between a successful `start` and the worker's exit.
    fn is_alive(&self) -> bool {
        self.core().is_alive()
    }

    /// Requests a cooperative pause.
    ///
    /// Valid only from `Running`; otherwise a logged no-op returning
    /// `false`. Takes effect at the worker's next loop-top check; an
    /// in-flight invocation is never interrupted.
    fn pause(&self) -> bool {
        self.core().pause()
    }

    /// Reopens the pause gate.
    ///
    /// Valid only from `Paused`; otherwise a logged no-op returning
    /// `false`.
    fn resume(&self) -> bool {
        self.core().resume()
    }

    /// Stops the task: graceful first, bounded by `timeout`; forced as a
    /// last resort when `force` is set.
    ///
    /// Idempotent: on an already-terminal task this is a no-op
    /// returning `true`. Returns whether the worker is known to have
    /// ended; with `force` the attempt is best-effort and `false` means
    /// the worker's state is uncertain. Either way the task ends
    /// deregistered and in a terminal status.
    fn stop(&self, force: bool, timeout: Duration) -> bool {
        self.core().stop(force, timeout)
    }

    /// Blocks until the worker ends or `timeout` elapses; `None` waits
    /// without bound. Never changes status.
    ///
    /// Returns whether the worker had ended when the wait finished.
    fn join(&self, timeout: Option<Duration>) -> bool {
        self.core().join(timeout)
    }
}

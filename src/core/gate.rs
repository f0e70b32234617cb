//! # Binary gate: the latch behind pause, stop, and completion signals.
//!
//! [`Gate`] is a condvar-backed boolean latch. Each task owns three:
//!
//! - **pause gate** — closed = suspended; the worker waits on it between
//!   units of work (open initially).
//! - **stop latch** — open = stop requested; also serves as the
//!   interruptible inter-iteration sleep (closed initially).
//! - **done latch** — opens exactly once when the worker exits; `join`
//!   and `wait_for_result` wait on it (broadcast wakeup).
//!
//! [`StopToken`] is the user-facing view of the stop latch, handed to
//! user functions so they can poll cancellation at safe points instead of
//! relying on forced termination.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Condvar-backed boolean latch.
///
/// All operations are cheap signal flips; only `wait`/`wait_for` block.
/// Opening an already-open gate is a no-op, so completion latches fire
/// their wakeup exactly once.
pub(crate) struct Gate {
    open: Mutex<bool>,
    cvar: Condvar,
}

impl Gate {
    pub(crate) fn new(open: bool) -> Self {
        Self {
            open: Mutex::new(open),
            cvar: Condvar::new(),
        }
    }

    /// Opens the gate and wakes every waiter. No-op if already open.
    pub(crate) fn open(&self) {
        let mut open = self.open.lock();
        if !*open {
            *open = true;
            self.cvar.notify_all();
        }
    }

    /// Closes the gate. Waiters already past it are unaffected.
    pub(crate) fn close(&self) {
        *self.open.lock() = false;
    }

    pub(crate) fn is_open(&self) -> bool {
        *self.open.lock()
    }

    /// Blocks until the gate is open.
    pub(crate) fn wait(&self) {
        let mut open = self.open.lock();
        while !*open {
            self.cvar.wait(&mut open);
        }
    }

    /// Blocks until the gate is open or `timeout` elapses.
    ///
    /// Returns whether the gate was open when the wait ended.
    pub(crate) fn wait_for(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut open = self.open.lock();
        while !*open {
            if self.cvar.wait_until(&mut open, deadline).timed_out() {
                return *open;
            }
        }
        true
    }
}

/// # Cooperative cancellation probe for user functions.
///
/// Every invocation of a user function receives a `&StopToken`. Long or
/// blocking work should poll [`is_stop_requested`](StopToken::is_stop_requested)
/// at safe points, or sleep via [`wait_for`](StopToken::wait_for) so a
/// `stop` request interrupts the sleep; forced termination is a last
/// resort, not a substitute for checking this token.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use threadvisor::{OnceTask, TaskError};
///
/// let task = OnceTask::spawn("poller", |token| {
///     while !token.is_stop_requested() {
///         // do one bounded unit of work, then nap
///         if token.wait_for(Duration::from_millis(10)) {
///             break; // stop requested during the nap
///         }
///     }
///     Ok::<_, TaskError>(())
/// }).unwrap();
/// task.stop(false, Duration::from_secs(1));
/// ```
#[derive(Clone)]
pub struct StopToken {
    stop: Arc<Gate>,
}

impl StopToken {
    pub(crate) fn new(stop: Arc<Gate>) -> Self {
        Self { stop }
    }

    /// True once `stop` has been requested for the owning task.
    pub fn is_stop_requested(&self) -> bool {
        self.stop.is_open()
    }

    /// Sleeps up to `timeout`, waking early on a stop request.
    ///
    /// Returns `true` when stop was requested.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        self.stop.wait_for(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_wait_for_times_out_when_closed() {
        let gate = Gate::new(false);
        assert!(!gate.wait_for(Duration::from_millis(20)));
        assert!(!gate.is_open());
    }

    #[test]
    fn test_wait_for_returns_immediately_when_open() {
        let gate = Gate::new(true);
        assert!(gate.wait_for(Duration::from_millis(0)));
    }

    #[test]
    fn test_open_wakes_waiter() {
        let gate = Arc::new(Gate::new(false));
        let waiter = {
            let gate = gate.clone();
            thread::spawn(move || gate.wait_for(Duration::from_secs(5)))
        };
        thread::sleep(Duration::from_millis(10));
        gate.open();
        assert!(waiter.join().unwrap());
    }

    #[test]
    fn test_token_reflects_stop_latch() {
        let stop = Arc::new(Gate::new(false));
        let token = StopToken::new(stop.clone());
        assert!(!token.is_stop_requested());
        stop.open();
        assert!(token.is_stop_requested());
        assert!(token.wait_for(Duration::from_millis(1)));
    }
}

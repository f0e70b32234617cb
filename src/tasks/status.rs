//! # Task status machine and the continue/stop signal.
//!
//! [`TaskStatus`] is the single authoritative lifecycle field of a task:
//!
//! ```text
//! Created ──► Running ◄──► Paused
//!                │
//!                ├──► Stopping ──► Stopped
//!                ├──► Finished   (one-shot success)
//!                └──► Error      (unhandled failure path)
//! ```
//!
//! `Stopped`, `Finished`, and `Error` are terminal; no transition leaves
//! a terminal state.
//!
//! [`Signal`] is the tagged value a repeating task's function returns to
//! keep iterating or to request its own graceful stop. The payload is the
//! iteration value recorded into the task's outcome, so a legitimate
//! return value can never collide with the stop request (the way a
//! string sentinel could).

/// Lifecycle status of a task instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Constructed, not yet started.
    Created,
    /// Worker thread is executing (or between iterations).
    Running,
    /// Pause gate is closed; the worker is suspended between units of work.
    Paused,
    /// Stop requested; the worker has not yet confirmed exit.
    Stopping,
    /// Terminal: stopped by request (external `stop` or the task's own
    /// stop signal).
    Stopped,
    /// Terminal: one-shot task completed successfully.
    Finished,
    /// Terminal: the failure path was taken.
    Error,
}

impl TaskStatus {
    /// True for `Stopped`, `Finished`, and `Error`.
    ///
    /// # Example
    /// ```
    /// use threadvisor::TaskStatus;
    ///
    /// assert!(TaskStatus::Stopped.is_terminal());
    /// assert!(!TaskStatus::Paused.is_terminal());
    /// ```
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Stopped | TaskStatus::Finished | TaskStatus::Error
        )
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskStatus::Created => "created",
            TaskStatus::Running => "running",
            TaskStatus::Paused => "paused",
            TaskStatus::Stopping => "stopping",
            TaskStatus::Stopped => "stopped",
            TaskStatus::Finished => "finished",
            TaskStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Return value of a repeating task's function: keep going or stop.
///
/// Modeled on [`std::ops::ControlFlow`]; the payload is recorded as the
/// task's current value either way.
///
/// # Example
/// ```
/// use threadvisor::Signal;
///
/// let mut calls = 0;
/// let mut step = move || {
///     calls += 1;
///     if calls >= 3 { Signal::Stop(calls) } else { Signal::Continue(calls) }
/// };
/// assert_eq!(step(), Signal::Continue(1));
/// assert_eq!(step(), Signal::Continue(2));
/// assert!(step().is_stop());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal<T = ()> {
    /// Record the value and run the next iteration.
    Continue(T),
    /// Record the value, then stop gracefully after this iteration.
    Stop(T),
}

impl<T> Signal<T> {
    /// True for [`Signal::Stop`].
    pub fn is_stop(&self) -> bool {
        matches!(self, Signal::Stop(_))
    }

    /// Extracts the payload regardless of variant.
    pub fn into_value(self) -> T {
        match self {
            Signal::Continue(value) | Signal::Stop(value) => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        for status in [TaskStatus::Stopped, TaskStatus::Finished, TaskStatus::Error] {
            assert!(status.is_terminal(), "{status} should be terminal");
        }
        for status in [
            TaskStatus::Created,
            TaskStatus::Running,
            TaskStatus::Paused,
            TaskStatus::Stopping,
        ] {
            assert!(!status.is_terminal(), "{status} should not be terminal");
        }
    }

    #[test]
    fn test_signal_payload() {
        assert_eq!(Signal::Continue(7).into_value(), 7);
        assert_eq!(Signal::Stop(9).into_value(), 9);
        assert!(!Signal::Continue(()).is_stop());
        assert!(Signal::Stop(()).is_stop());
    }
}

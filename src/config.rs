//! # Per-task configuration.
//!
//! [`TaskConfig`] defines a task's control behavior: daemon-ness (what
//! happens when the owning handle is dropped), stop-on-error escalation,
//! the inter-iteration delay for repeating tasks, and the default timeout
//! used for drop-initiated stops.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use threadvisor::TaskConfig;
//!
//! let mut cfg = TaskConfig::default();
//! cfg.stop_on_error = true;
//! cfg.interval = Duration::from_millis(250);
//!
//! assert_eq!(cfg.interval_delay(), Some(Duration::from_millis(250)));
//! ```

use std::time::Duration;

/// Configuration for a single task instance.
///
/// Usually assembled through [`TaskBuilder`](crate::TaskBuilder); the
/// fields are public so a config can also be built directly.
#[derive(Clone, Debug)]
pub struct TaskConfig {
    /// Daemon tasks detach when their handle is dropped; non-daemon
    /// tasks issue a graceful stop bounded by [`stop_timeout`] first.
    ///
    /// [`stop_timeout`]: TaskConfig::stop_timeout
    pub daemon: bool,
    /// Escalate a user-function error to a stop request.
    pub stop_on_error: bool,
    /// Delay between iterations of a repeating task (`0` = back-to-back).
    ///
    /// Ignored by one-shot tasks.
    pub interval: Duration,
    /// Bound for drop-initiated graceful stops.
    pub stop_timeout: Duration,
}

impl TaskConfig {
    /// Returns the inter-iteration delay, treating `0` as "no delay".
    pub fn interval_delay(&self) -> Option<Duration> {
        if self.interval.is_zero() {
            None
        } else {
            Some(self.interval)
        }
    }
}

impl Default for TaskConfig {
    /// Provides a default configuration:
    /// - `daemon = false`
    /// - `stop_on_error = false`
    /// - `interval = 0s` (back-to-back iterations)
    /// - `stop_timeout = 5s`
    fn default() -> Self {
        Self {
            daemon: false,
            stop_on_error: false,
            interval: Duration::ZERO,
            stop_timeout: Duration::from_secs(5),
        }
    }
}

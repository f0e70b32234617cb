//! Error types used by the threadvisor runtime and tasks.
//!
//! This module defines two main error enums:
//!
//! - [`ControlError`] — errors raised synchronously to the caller of a
//!   control operation (`start`, `wait_for_result`, registration).
//! - [`TaskError`] — failures of the user function inside a worker thread.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for
//! logging, and [`TaskError`] is cloneable so outcome snapshots can carry it.

use std::time::Duration;
use thiserror::Error;

/// # Errors raised to the direct caller of a control operation.
///
/// These represent caller-attributable misuse or environment failures:
/// a name collision, a double `start`, a worker thread that could not be
/// spawned, or a bounded wait that ran out of time.
///
/// Everything that happens *inside* a worker is never raised across the
/// thread boundary; it is absorbed into the task's [`TaskOutcome`]
/// (see [`TaskError`]).
///
/// [`TaskOutcome`]: crate::TaskOutcome
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ControlError {
    /// A task with the same name is already registered and alive.
    #[error("task name '{name}' is already registered")]
    DuplicateName {
        /// The colliding task name.
        name: String,
    },

    /// `start` was called twice on the same task instance.
    #[error("task '{name}' already started")]
    AlreadyStarted {
        /// Name of the task.
        name: String,
    },

    /// The OS refused to spawn the worker thread.
    ///
    /// The task was deregistered automatically and is left in the
    /// `Error` status; it cannot be restarted.
    #[error("failed to spawn worker thread for task '{name}'")]
    Spawn {
        /// Name of the task.
        name: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A bounded wait elapsed before the task completed.
    #[error("task '{name}' did not complete within {timeout:?}")]
    WaitTimeout {
        /// Name of the task.
        name: String,
        /// The bound that elapsed.
        timeout: Duration,
    },
}

impl ControlError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use threadvisor::ControlError;
    ///
    /// let err = ControlError::DuplicateName { name: "worker".into() };
    /// assert_eq!(err.as_label(), "duplicate_name");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ControlError::DuplicateName { .. } => "duplicate_name",
            ControlError::AlreadyStarted { .. } => "already_started",
            ControlError::Spawn { .. } => "spawn_failed",
            ControlError::WaitTimeout { .. } => "wait_timeout",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ControlError::DuplicateName { name } => format!("duplicate name: {name}"),
            ControlError::AlreadyStarted { name } => format!("already started: {name}"),
            ControlError::Spawn { name, source } => format!("spawn failed for {name}: {source}"),
            ControlError::WaitTimeout { name, timeout } => {
                format!("wait timed out for {name} after {timeout:?}")
            }
        }
    }
}

/// # Failures of the user function inside a worker thread.
///
/// These never escape the worker uncaught: they are recorded into the
/// task's outcome, forwarded to the optional error handler, and (when
/// the task is configured with stop-on-error) escalated to a stop
/// request.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum TaskError {
    /// The user function returned an error.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The user function panicked; the panic was caught at the
    /// invocation boundary.
    #[error("panicked: {info}")]
    Panic {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl TaskError {
    /// Creates a [`TaskError::Fail`] from anything message-like.
    ///
    /// # Example
    /// ```
    /// use threadvisor::TaskError;
    ///
    /// let err = TaskError::fail("connection refused");
    /// assert_eq!(err.as_label(), "task_failed");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panic { .. } => "task_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Panic { info } => format!("panic: {info}"),
        }
    }

    /// True when this error came from a caught panic rather than an
    /// error return.
    pub fn is_panic(&self) -> bool {
        matches!(self, TaskError::Panic { .. })
    }
}

impl From<String> for TaskError {
    fn from(error: String) -> Self {
        TaskError::Fail { error }
    }
}

impl From<&str> for TaskError {
    fn from(error: &str) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }
}

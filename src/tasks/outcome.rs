//! # Result envelope for a task's execution.
//!
//! [`TaskOutcome`] bundles the latest recorded value, the last captured
//! error, and the task's status. For a one-shot task the value is written
//! exactly once at completion; for a repeating task it is overwritten
//! after every iteration.
//!
//! An outcome is always a *snapshot*: the stored fields are value and
//! error, while `status` is read live from the task at snapshot time, so
//! the envelope can never disagree with the authoritative status field.

use parking_lot::Mutex;

use crate::error::TaskError;
use crate::tasks::status::TaskStatus;

/// Snapshot of a task's result at a point in time.
#[derive(Debug, Clone)]
pub struct TaskOutcome<T> {
    /// Latest value recorded by the user function, if any.
    pub value: Option<T>,
    /// Last captured error, if any.
    pub error: Option<TaskError>,
    /// Task status at snapshot time.
    pub status: TaskStatus,
}

impl<T> TaskOutcome<T> {
    /// True iff no error was recorded and the task ended in `Finished`
    /// or `Stopped`.
    ///
    /// # Example
    /// ```
    /// use threadvisor::{TaskOutcome, TaskStatus};
    ///
    /// let outcome = TaskOutcome { value: Some(42), error: None, status: TaskStatus::Finished };
    /// assert!(outcome.success());
    ///
    /// let pending = TaskOutcome { value: Some(42), error: None, status: TaskStatus::Running };
    /// assert!(!pending.success());
    /// ```
    pub fn success(&self) -> bool {
        self.error.is_none()
            && matches!(self.status, TaskStatus::Finished | TaskStatus::Stopped)
    }
}

/// Shared value/error cell written by the worker, snapshotted by readers.
///
/// The owning worker is the sole writer; readers only ever take clones.
pub(crate) struct OutcomeCell<T> {
    inner: Mutex<(Option<T>, Option<TaskError>)>,
}

impl<T> OutcomeCell<T> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new((None, None)),
        }
    }

    pub(crate) fn record_value(&self, value: T) {
        self.inner.lock().0 = Some(value);
    }

    pub(crate) fn record_error(&self, error: TaskError) {
        self.inner.lock().1 = Some(error);
    }

    pub(crate) fn snapshot(&self, status: TaskStatus) -> TaskOutcome<T>
    where
        T: Clone,
    {
        let inner = self.inner.lock();
        TaskOutcome {
            value: inner.0.clone(),
            error: inner.1.clone(),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_requires_terminal_and_no_error() {
        let cell: OutcomeCell<u32> = OutcomeCell::new();
        cell.record_value(1);
        assert!(!cell.snapshot(TaskStatus::Running).success());
        assert!(cell.snapshot(TaskStatus::Stopped).success());
        assert!(cell.snapshot(TaskStatus::Finished).success());

        cell.record_error(TaskError::fail("boom"));
        let outcome = cell.snapshot(TaskStatus::Stopped);
        assert!(!outcome.success());
        assert_eq!(outcome.value, Some(1));
    }
}

//! # One-shot task: invoke the user function exactly once.
//!
//! The run strategy invokes the function a single time, records the
//! return value or the captured error, and exits `Finished` or `Error`.
//! The done latch opens exactly once on any exit path (success, error,
//! or forced stop), so [`OnceTask::wait_for_result`] has broadcast
//! semantics: it can be called repeatedly and from multiple threads.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::core::gate::StopToken;
use crate::error::{ControlError, TaskError};
use crate::tasks::base::{self, AsCore, TaskCore};
use crate::tasks::outcome::{OutcomeCell, TaskOutcome};
use crate::tasks::status::TaskStatus;
use crate::tasks::task::{Task, TaskRef};
use crate::tasks::TaskBuilder;

type OnceFn<T> = Box<dyn FnOnce(&StopToken) -> Result<T, TaskError> + Send>;

pub(crate) struct OnceInner<T> {
    core: TaskCore,
    /// Taken by the worker on its only invocation.
    func: Mutex<Option<OnceFn<T>>>,
    outcome: OutcomeCell<T>,
}

impl<T> OnceInner<T> {
    fn run_once(&self) -> TaskStatus {
        let token = self.core.stop_token();
        let Some(func) = self.func.lock().take() else {
            // Unreachable behind the start-once guard.
            return TaskStatus::Error;
        };
        match panic::catch_unwind(AssertUnwindSafe(|| func(&token))) {
            Ok(Ok(value)) => {
                self.outcome.record_value(value);
                TaskStatus::Finished
            }
            Ok(Err(error)) => self.fail(error),
            Err(payload) => self.fail(TaskError::Panic {
                info: base::panic_message(payload),
            }),
        }
    }

    fn fail(&self, error: TaskError) -> TaskStatus {
        self.core.route_error(&error);
        self.outcome.record_error(error);
        TaskStatus::Error
    }
}

impl<T> AsCore for OnceInner<T> {
    fn core(&self) -> &TaskCore {
        &self.core
    }
}

impl<T: Send + 'static> Task for OnceInner<T> {}

/// # Owning handle to a one-shot task.
///
/// The function runs exactly once on its own thread; the caller collects
/// the result with [`wait_for_result`](OnceTask::wait_for_result).
///
/// One-shot handles default to daemon: dropping the handle detaches the
/// worker rather than stopping it.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use threadvisor::{OnceTask, TaskError};
///
/// let task = OnceTask::spawn("answer", |_token| Ok::<_, TaskError>(21 * 2)).unwrap();
/// let outcome = task.wait_for_result(Some(Duration::from_secs(1))).unwrap();
///
/// assert_eq!(outcome.value, Some(42));
/// assert!(outcome.success());
/// ```
pub struct OnceTask<T: Send + 'static> {
    inner: Arc<OnceInner<T>>,
}

impl<T: Send + 'static> OnceTask<T> {
    /// Creates a builder; finish with
    /// [`build_once`](TaskBuilder::build_once) or
    /// [`spawn_once`](TaskBuilder::spawn_once).
    pub fn builder() -> TaskBuilder {
        TaskBuilder::new()
    }

    /// Builds a named task with default configuration, not yet started.
    pub fn new<F, E>(name: impl Into<String>, func: F) -> Self
    where
        F: FnOnce(&StopToken) -> Result<T, E> + Send + 'static,
        E: Into<TaskError>,
    {
        TaskBuilder::new().name(name).build_once(func)
    }

    /// Builds a named task with default configuration and starts it.
    pub fn spawn<F, E>(name: impl Into<String>, func: F) -> Result<Self, ControlError>
    where
        F: FnOnce(&StopToken) -> Result<T, E> + Send + 'static,
        E: Into<TaskError>,
    {
        let task = Self::new(name, func);
        task.start()?;
        Ok(task)
    }

    pub(crate) fn from_parts<F, E>(core: TaskCore, func: F) -> Self
    where
        F: FnOnce(&StopToken) -> Result<T, E> + Send + 'static,
        E: Into<TaskError>,
    {
        Self {
            inner: Arc::new(OnceInner {
                core,
                func: Mutex::new(Some(Box::new(move |token| {
                    func(token).map_err(Into::into)
                }))),
                outcome: OutcomeCell::new(),
            }),
        }
    }

    /// Starts the worker thread and registers the task.
    pub fn start(&self) -> Result<&Self, ControlError> {
        let inner = self.inner.clone();
        base::start_worker(self.inner.clone() as TaskRef, move || inner.run_once())?;
        Ok(self)
    }

    /// Blocks until the task completes, bounded by `timeout` (`None` =
    /// no bound), then returns an outcome snapshot.
    ///
    /// Fails with [`ControlError::WaitTimeout`] when the bound elapses
    /// first. Broadcast semantics: safe to call repeatedly and from
    /// multiple callers; every waiter observes the same completion.
    pub fn wait_for_result(&self, timeout: Option<Duration>) -> Result<TaskOutcome<T>, ControlError>
    where
        T: Clone,
    {
        match timeout {
            Some(bound) => {
                if !self.inner.core.done_wait_for(bound) {
                    return Err(ControlError::WaitTimeout {
                        name: self.name().to_string(),
                        timeout: bound,
                    });
                }
            }
            None => self.inner.core.done_wait(),
        }
        Ok(self.outcome())
    }

    /// True once the completion event has fired.
    pub fn is_completed(&self) -> bool {
        self.inner.core.is_done()
    }

    /// Stable task name.
    pub fn name(&self) -> &str {
        self.inner.core.name()
    }

    /// Current lifecycle status.
    pub fn status(&self) -> TaskStatus {
        self.inner.core.status()
    }

    /// True between a successful `start` and the worker's exit.
    pub fn is_alive(&self) -> bool {
        self.inner.core.is_alive()
    }

    /// See [`Task::pause`]. Rarely useful for one-shot tasks: the pause
    /// gate sits between units of work and a one-shot task has only one.
    pub fn pause(&self) -> bool {
        self.inner.pause()
    }

    /// See [`Task::resume`].
    pub fn resume(&self) -> bool {
        self.inner.resume()
    }

    /// See [`Task::stop`].
    pub fn stop(&self, force: bool, timeout: Duration) -> bool {
        self.inner.stop(force, timeout)
    }

    /// See [`Task::join`].
    pub fn join(&self, timeout: Option<Duration>) -> bool {
        self.inner.join(timeout)
    }

    /// Snapshot of the value, error, and current status.
    pub fn outcome(&self) -> TaskOutcome<T>
    where
        T: Clone,
    {
        self.inner.outcome.snapshot(self.inner.core.status())
    }

    /// Type-erased handle, as stored by the registry.
    pub fn as_task(&self) -> TaskRef {
        self.inner.clone()
    }
}

impl<T: Send + 'static> Drop for OnceTask<T> {
    fn drop(&mut self) {
        let core = self.inner.core();
        if !core.config().daemon && core.started() && !core.status().is_terminal() {
            let timeout = core.config().stop_timeout;
            self.inner.stop(false, timeout);
        }
    }
}

impl<T: Send + 'static> std::fmt::Debug for OnceTask<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnceTask")
            .field("name", &self.name())
            .field("status", &self.status())
            .finish()
    }
}

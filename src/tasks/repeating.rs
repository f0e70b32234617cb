//! # Repeating task: invoke the user function until told to stop.
//!
//! The run strategy, one pass per iteration:
//!
//! ```text
//! loop {
//!   ├─► stop requested?          ─► exit (Stopped)
//!   ├─► wait on the pause gate      (suspends the worker, not the caller)
//!   ├─► stop requested?          ─► exit (Stopped)
//!   ├─► invoke user function (panics caught at the boundary)
//!   │     ├─ Continue(v) ─► record value
//!   │     ├─ Stop(v)     ─► record value, exit (Stopped)
//!   │     └─ Err/panic   ─► route error; stop-on-error ─► exit (Error)
//!   └─► optional interval sleep on the stop latch (stop interrupts it)
//! }
//! ```
//!
//! Exactly one invocation per pass. `pause`/`resume`/`stop` only touch
//! the shared gates, so a request landing mid-invocation takes effect at
//! the next loop-top check.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::core::gate::StopToken;
use crate::error::{ControlError, TaskError};
use crate::tasks::base::{self, AsCore, TaskCore};
use crate::tasks::outcome::{OutcomeCell, TaskOutcome};
use crate::tasks::status::{Signal, TaskStatus};
use crate::tasks::task::{Task, TaskRef};
use crate::tasks::TaskBuilder;

type RepeatingFn<T> = Box<dyn FnMut(&StopToken) -> Result<Signal<T>, TaskError> + Send>;

pub(crate) struct RepeatingInner<T> {
    core: TaskCore,
    /// Guarded so the `FnMut` closure can be driven through `&self`;
    /// held only for the duration of one invocation.
    func: Mutex<RepeatingFn<T>>,
    outcome: OutcomeCell<T>,
}

impl<T> RepeatingInner<T> {
    fn run_loop(&self) -> TaskStatus {
        let token = self.core.stop_token();
        loop {
            if self.core.stop_requested() {
                return TaskStatus::Stopped;
            }
            self.core.pause_point();
            if self.core.stop_requested() {
                return TaskStatus::Stopped;
            }

            let call = {
                let mut func = self.func.lock();
                panic::catch_unwind(AssertUnwindSafe(|| (&mut *func)(&token)))
            };
            match call {
                Ok(Ok(Signal::Continue(value))) => self.outcome.record_value(value),
                Ok(Ok(Signal::Stop(value))) => {
                    self.outcome.record_value(value);
                    return TaskStatus::Stopped;
                }
                Ok(Err(error)) => {
                    if self.fail(error) {
                        return TaskStatus::Error;
                    }
                }
                Err(payload) => {
                    let error = TaskError::Panic {
                        info: base::panic_message(payload),
                    };
                    if self.fail(error) {
                        return TaskStatus::Error;
                    }
                }
            }

            if let Some(delay) = self.core.config().interval_delay() {
                if self.core.stop_wait(delay) {
                    return TaskStatus::Stopped;
                }
            }
        }
    }

    /// Records and routes one error; true = stop-on-error escalation.
    fn fail(&self, error: TaskError) -> bool {
        let escalate = self.core.route_error(&error);
        self.outcome.record_error(error);
        escalate
    }
}

impl<T> AsCore for RepeatingInner<T> {
    fn core(&self) -> &TaskCore {
        &self.core
    }
}

impl<T: Send + 'static> Task for RepeatingInner<T> {}

/// # Owning handle to a repeating task.
///
/// The function is invoked repeatedly until an external `stop`, a
/// [`Signal::Stop`] return, or a stop-on-error escalation. `T` is the
/// per-iteration value recorded into the outcome.
///
/// Dropping a non-daemon handle (the default for repeating tasks) issues
/// a graceful stop bounded by the configured stop timeout, which gives
/// scoped usage for free: start inside a block, and every exit path
/// stops the task.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use threadvisor::{RepeatingTask, Signal, TaskError, TaskStatus};
///
/// let task = RepeatingTask::spawn("countdown", {
///     let mut left = 3u32;
///     move |_token| {
///         left -= 1;
///         if left == 0 {
///             Ok::<_, TaskError>(Signal::Stop(left))
///         } else {
///             Ok(Signal::Continue(left))
///         }
///     }
/// }).unwrap();
///
/// task.join(Some(Duration::from_secs(1)));
/// assert_eq!(task.status(), TaskStatus::Stopped);
/// assert_eq!(task.outcome().value, Some(0));
/// ```
pub struct RepeatingTask<T: Send + 'static> {
    inner: Arc<RepeatingInner<T>>,
}

impl<T: Send + 'static> RepeatingTask<T> {
    /// Creates a builder; finish with
    /// [`build_repeating`](TaskBuilder::build_repeating) or
    /// [`spawn_repeating`](TaskBuilder::spawn_repeating).
    pub fn builder() -> TaskBuilder {
        TaskBuilder::new()
    }

    /// Builds a named task with default configuration, not yet started.
    pub fn new<F, E>(name: impl Into<String>, func: F) -> Self
    where
        F: FnMut(&StopToken) -> Result<Signal<T>, E> + Send + 'static,
        E: Into<TaskError>,
    {
        TaskBuilder::new().name(name).build_repeating(func)
    }

    /// Builds a named task with default configuration and starts it.
    pub fn spawn<F, E>(name: impl Into<String>, func: F) -> Result<Self, ControlError>
    where
        F: FnMut(&StopToken) -> Result<Signal<T>, E> + Send + 'static,
        E: Into<TaskError>,
    {
        let task = Self::new(name, func);
        task.start()?;
        Ok(task)
    }

    pub(crate) fn from_parts<F, E>(core: TaskCore, mut func: F) -> Self
    where
        F: FnMut(&StopToken) -> Result<Signal<T>, E> + Send + 'static,
        E: Into<TaskError>,
    {
        Self {
            inner: Arc::new(RepeatingInner {
                core,
                func: Mutex::new(Box::new(move |token| func(token).map_err(Into::into))),
                outcome: OutcomeCell::new(),
            }),
        }
    }

    /// Starts the worker thread and registers the task.
    ///
    /// Fails with [`ControlError::AlreadyStarted`] on a second call and
    /// with [`ControlError::DuplicateName`] when the name is held by a
    /// live task; a rejected task stays `Created` and may retry once
    /// the name frees up.
    pub fn start(&self) -> Result<&Self, ControlError> {
        let inner = self.inner.clone();
        base::start_worker(self.inner.clone() as TaskRef, move || inner.run_loop())?;
        Ok(self)
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

    /// See [`Task::pause`].
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

    /// Snapshot of the latest value, last error, and current status.
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

impl<T: Send + 'static> Drop for RepeatingTask<T> {
    fn drop(&mut self) {
        let core = self.inner.core();
        if !core.config().daemon && core.started() && !core.status().is_terminal() {
            let timeout = core.config().stop_timeout;
            self.inner.stop(false, timeout);
        }
    }
}

impl<T: Send + 'static> std::fmt::Debug for RepeatingTask<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepeatingTask")
            .field("name", &self.name())
            .field("status", &self.status())
            .finish()
    }
}

//! # Fluent construction for both task variants.
//!
//! [`TaskBuilder`] collects the name (auto-generated when absent), the
//! control flags, the optional error handler, and the target registry,
//! then builds a [`RepeatingTask`] or a [`OnceTask`]. The `spawn_*`
//! variants also start the task, which is the "turn this function into a
//! running task" sugar.
//!
//! Daemon defaults differ per variant: a repeating task is non-daemon
//! (dropping the handle stops it), a one-shot task is daemon (dropping
//! the handle detaches it).

use std::sync::Arc;
use std::time::Duration;

use rand::distr::Alphanumeric;
use rand::Rng;

use crate::config::TaskConfig;
use crate::core::gate::StopToken;
use crate::core::Registry;
use crate::error::{ControlError, TaskError};
use crate::tasks::base::{ErrorHandler, TaskCore};
use crate::tasks::once::OnceTask;
use crate::tasks::repeating::RepeatingTask;
use crate::tasks::status::Signal;

/// Builder for repeating and one-shot tasks.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use threadvisor::{Signal, TaskBuilder, TaskError};
///
/// let task = TaskBuilder::new()
///     .name("heartbeat")
///     .interval(Duration::from_millis(50))
///     .stop_on_error(true)
///     .spawn_repeating(|_token| {
///         // ping…
///         Ok::<_, TaskError>(Signal::Continue(()))
///     })
///     .unwrap();
///
/// task.stop(false, Duration::from_secs(1));
/// ```
pub struct TaskBuilder {
    name: Option<String>,
    daemon: Option<bool>,
    stop_on_error: bool,
    interval: Duration,
    stop_timeout: Duration,
    handler: Option<ErrorHandler>,
    registry: Option<Arc<Registry>>,
}

impl TaskBuilder {
    /// Creates a builder with default configuration and no name (one is
    /// generated at build time).
    pub fn new() -> Self {
        let defaults = TaskConfig::default();
        Self {
            name: None,
            daemon: None,
            stop_on_error: defaults.stop_on_error,
            interval: defaults.interval,
            stop_timeout: defaults.stop_timeout,
            handler: None,
            registry: None,
        }
    }

    /// Sets the task name. Must be unique within the registry while the
    /// task is alive.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Overrides the variant's daemon default (see the module docs).
    pub fn daemon(mut self, daemon: bool) -> Self {
        self.daemon = Some(daemon);
        self
    }

    /// Escalates user-function errors to a stop request.
    pub fn stop_on_error(mut self, stop_on_error: bool) -> Self {
        self.stop_on_error = stop_on_error;
        self
    }

    /// Delay between iterations of a repeating task.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Bound for drop-initiated graceful stops.
    pub fn stop_timeout(mut self, stop_timeout: Duration) -> Self {
        self.stop_timeout = stop_timeout;
        self
    }

    /// Installs an error handler, invoked once per captured
    /// user-function error. A panicking handler is caught and logged,
    /// never propagated.
    pub fn on_error(mut self, handler: impl Fn(&TaskError) + Send + Sync + 'static) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Registers the task in `registry` instead of the process-wide
    /// default; tests use private instances this way.
    pub fn registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Builds a repeating task, not yet started.
    pub fn build_repeating<T, F, E>(self, func: F) -> RepeatingTask<T>
    where
        T: Send + 'static,
        F: FnMut(&StopToken) -> Result<Signal<T>, E> + Send + 'static,
        E: Into<TaskError>,
    {
        let core = self.into_core(false);
        RepeatingTask::from_parts(core, func)
    }

    /// Builds a one-shot task, not yet started.
    pub fn build_once<T, F, E>(self, func: F) -> OnceTask<T>
    where
        T: Send + 'static,
        F: FnOnce(&StopToken) -> Result<T, E> + Send + 'static,
        E: Into<TaskError>,
    {
        let core = self.into_core(true);
        OnceTask::from_parts(core, func)
    }

    /// Builds a repeating task and starts it.
    pub fn spawn_repeating<T, F, E>(self, func: F) -> Result<RepeatingTask<T>, ControlError>
    where
        T: Send + 'static,
        F: FnMut(&StopToken) -> Result<Signal<T>, E> + Send + 'static,
        E: Into<TaskError>,
    {
        let task = self.build_repeating(func);
        task.start()?;
        Ok(task)
    }

    /// Builds a one-shot task and starts it.
    pub fn spawn_once<T, F, E>(self, func: F) -> Result<OnceTask<T>, ControlError>
    where
        T: Send + 'static,
        F: FnOnce(&StopToken) -> Result<T, E> + Send + 'static,
        E: Into<TaskError>,
    {
        let task = self.build_once(func);
        task.start()?;
        Ok(task)
    }

    fn into_core(self, daemon_default: bool) -> TaskCore {
        let cfg = TaskConfig {
            daemon: self.daemon.unwrap_or(daemon_default),
            stop_on_error: self.stop_on_error,
            interval: self.interval,
            stop_timeout: self.stop_timeout,
        };
        let name = self.name.unwrap_or_else(generate_name);
        let registry = self.registry.unwrap_or_else(Registry::global);
        TaskCore::new(name, cfg, registry, self.handler)
    }
}

impl Default for TaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Generates a name for an anonymous task.
fn generate_name() -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(10)
        .map(char::from)
        .collect();
    format!("task-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_names_are_distinct() {
        let a = generate_name();
        let b = generate_name();
        assert!(a.starts_with("task-"));
        assert_eq!(a.len(), "task-".len() + 10);
        assert_ne!(a, b);
    }
}

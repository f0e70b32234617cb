//! # Task registry: thread-safe name → task directory.
//!
//! The registry maps names to **non-owning** references: entries are
//! [`Weak`] handles, so the registry is never the reason a task object
//! stays alive. Once every strong reference is gone the entry goes dead
//! and is replaced or pruned on the next touch.
//!
//! ## Rules
//! - A name maps to at most one live task at a time; registering a second
//!   task under a live name is rejected with
//!   [`ControlError::DuplicateName`].
//! - Tasks register themselves on `start` and deregister at their
//!   terminal transition; deregistration only removes an entry that still
//!   points at the departing task, so a successor that reused the name is
//!   never evicted by its predecessor's cleanup.
//! - All reads are snapshots taken under the registry lock;
//!   [`stop_all`](Registry::stop_all) releases the lock before stopping
//!   anything, since stopping is slow and re-enters `unregister`.
//!
//! ## Global instance
//! [`Registry::global`] returns the conventional process-wide registry,
//! constructed once and never reset. Tasks accept a registry as an
//! injectable dependency ([`TaskBuilder::registry`]), so tests use
//! private instances instead of the shared default.
//!
//! [`TaskBuilder::registry`]: crate::TaskBuilder::registry

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Weak};
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::ControlError;
use crate::tasks::{Task, TaskRef};

static GLOBAL: LazyLock<Arc<Registry>> = LazyLock::new(|| Arc::new(Registry::new()));

/// Thread-safe directory of live tasks, keyed by name.
///
/// Holds weak references only; see the module docs for the ownership and
/// locking rules.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use threadvisor::{Registry, TaskBuilder, Signal, TaskError};
///
/// let registry = Arc::new(Registry::new());
/// let task = TaskBuilder::new()
///     .name("ticker")
///     .registry(registry.clone())
///     .spawn_repeating(|_token| Ok::<_, TaskError>(Signal::Stop(())))
///     .unwrap();
///
/// assert!(registry.get("ticker").is_some() || task.status().is_terminal());
/// ```
pub struct Registry {
    tasks: Mutex<HashMap<String, Weak<dyn Task>>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the process-wide default registry.
    ///
    /// Constructed on first use and never reset. This is the registry
    /// tasks land in unless the builder was given a private one.
    pub fn global() -> Arc<Registry> {
        GLOBAL.clone()
    }

    /// Registers a task under its name.
    ///
    /// Fails with [`ControlError::DuplicateName`] when the name is held
    /// by a live task; a dead entry under the same name is replaced.
    pub fn register(&self, task: &TaskRef) -> Result<(), ControlError> {
        let name = task.name().to_string();
        let mut tasks = self.tasks.lock();
        if let Some(existing) = tasks.get(&name) {
            if existing.upgrade().is_some() {
                return Err(ControlError::DuplicateName { name });
            }
        }
        tasks.insert(name, Arc::downgrade(task));
        Ok(())
    }

    /// Removes the entry for `name`, returning the task if it was still
    /// alive. Absence is not an error.
    pub fn unregister(&self, name: &str) -> Option<TaskRef> {
        self.tasks.lock().remove(name)?.upgrade()
    }

    /// Removes the entry for `name` only if it still points at `who`.
    ///
    /// Used by a task's own terminal cleanup: a finished task must never
    /// evict a successor that reused its name.
    pub(crate) fn unregister_entry(&self, name: &str, who: &Weak<dyn Task>) {
        let mut tasks = self.tasks.lock();
        if let Some(entry) = tasks.get(name) {
            if Weak::ptr_eq(entry, who) {
                tasks.remove(name);
            }
        }
    }

    /// Looks up a live task by name.
    pub fn get(&self, name: &str) -> Option<TaskRef> {
        self.tasks.lock().get(name)?.upgrade()
    }

    /// True when a live task is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns a snapshot of all live tasks.
    ///
    /// The snapshot is an independent copy: iterating it is safe against
    /// concurrent registration and removal. Dead entries are pruned as a
    /// side effect.
    pub fn tasks(&self) -> Vec<TaskRef> {
        let mut tasks = self.tasks.lock();
        let mut alive = Vec::with_capacity(tasks.len());
        tasks.retain(|_, weak| match weak.upgrade() {
            Some(task) => {
                alive.push(task);
                true
            }
            None => false,
        });
        alive
    }

    /// Returns the sorted names of all live tasks.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tasks().iter().map(|t| t.name().to_string()).collect();
        names.sort_unstable();
        names
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.tasks().len()
    }

    /// True when no live entries remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stops every registered task.
    ///
    /// Snapshots the current entries, then calls
    /// [`Task::stop`] on each outside the registry lock. `force` and
    /// `timeout` are passed through per task.
    pub fn stop_all(&self, force: bool, timeout: Duration) {
        for task in self.tasks() {
            task.stop(force, timeout);
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

//! # threadvisor
//!
//! **Threadvisor** is a small control layer over native execution threads.
//!
//! It lets a caller start a unit of work on its own OS thread, pause and
//! resume it cooperatively, stop it gracefully or forcibly, collect its
//! result or error, and discover running tasks by name through a shared
//! registry. The crate is designed as a building block for long-lived
//! background workers, not as a scheduler: one native thread per task,
//! one task per logical unit of work; no queuing, no priorities, no
//! thread pool.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────────┐        ┌──────────────────┐
//!     │ RepeatingTask<T> │        │   OnceTask<T>    │
//!     │ (cycle variant)  │        │  (once variant)  │
//!     └──────┬───────────┘        └────────┬─────────┘
//!            │  run strategy               │  run strategy
//!            ▼                             ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │  TaskCore (shared control skeleton)                       │
//! │  - status machine (Created/Running/Paused/…)              │
//! │  - pause gate · stop latch · done latch                   │
//! │  - worker JoinHandle, error routing, finish guard         │
//! └──────┬──────────────────────────────────────┬─────────────┘
//!        │ register / deregister                │ stop / join
//!        ▼                                      ▼
//! ┌──────────────────┐                 ┌──────────────────────┐
//! │     Registry     │                 │  worker thread       │
//! │ name → Weak<dyn  │                 │  (one per task,      │
//! │        Task>     │                 │   exclusively owned) │
//! └──────────────────┘                 └──────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! builder ──► start() ──► register in Registry ──► spawn worker
//!
//! worker loop (repeating):
//!   ├─► stop latch open?  ─► exit Stopped
//!   ├─► wait pause gate       (cooperative suspension)
//!   ├─► invoke user fn        (panics caught at the boundary)
//!   │     ├─ Continue(v) ─► record value, next pass
//!   │     ├─ Stop(v)     ─► record value, exit Stopped
//!   │     └─ error       ─► route (handler, stop-on-error) ─► Error?
//!   └─► interval sleep on the stop latch
//!
//! on exit (any path): seal terminal status ─► deregister ─► open done
//! ```
//!
//! ## Features
//! | Area           | Description                                                   | Key types                            |
//! |----------------|---------------------------------------------------------------|--------------------------------------|
//! | **Variants**   | Repeating (until stopped) and one-shot (exactly once) tasks.  | [`RepeatingTask`], [`OnceTask`]      |
//! | **Control**    | Pause, resume, graceful stop with bound, forced stop opt-in.  | [`Task`], [`StopToken`]              |
//! | **Results**    | Value/error/status envelope, broadcast wait for completion.   | [`TaskOutcome`], [`Signal`]          |
//! | **Discovery**  | Non-owning name → task directory, bulk stop.                  | [`Registry`], [`TaskRef`]            |
//! | **Errors**     | Caller misuse vs. in-worker failures, cleanly separated.      | [`ControlError`], [`TaskError`]      |
//!
//! ## Cooperative first, forced last
//! Pause and stop are checked only between units of work: an in-flight
//! invocation of the user function is never interrupted cooperatively.
//! User functions receive a [`StopToken`] and should poll it at safe
//! points. `stop(force = true, …)` exists for workers stuck in code the
//! controller does not own; it is a best-effort, platform-dependent
//! last resort, never a substitute for polling the token.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use std::time::Duration;
//! use threadvisor::{Signal, TaskBuilder, TaskError, TaskStatus};
//!
//! let hits = Arc::new(AtomicU64::new(0));
//! let task = TaskBuilder::new()
//!     .name("counter")
//!     .interval(Duration::from_millis(1))
//!     .spawn_repeating({
//!         let hits = hits.clone();
//!         move |_token| {
//!             hits.fetch_add(1, Ordering::SeqCst);
//!             Ok::<_, TaskError>(Signal::Continue(()))
//!         }
//!     })
//!     .unwrap();
//!
//! std::thread::sleep(Duration::from_millis(50));
//! task.stop(false, Duration::from_secs(1));
//!
//! assert!(hits.load(Ordering::SeqCst) > 0);
//! assert_eq!(task.status(), TaskStatus::Stopped);
//! assert!(threadvisor::get_task("counter").is_none());
//! ```

use std::time::Duration;

mod config;
mod core;
mod error;
mod tasks;

// ---- Public re-exports ----

pub use crate::config::TaskConfig;
pub use crate::core::{Registry, StopToken};
pub use crate::error::{ControlError, TaskError};
pub use crate::tasks::{
    OnceTask, RepeatingTask, Signal, Task, TaskBuilder, TaskOutcome, TaskRef, TaskStatus,
};

/// Looks up a task by name in the process-wide registry.
///
/// Shorthand for `Registry::global().get(name)`.
pub fn get_task(name: &str) -> Option<TaskRef> {
    Registry::global().get(name)
}

/// Stops every task registered in the process-wide registry.
///
/// Shorthand for `Registry::global().stop_all(force, timeout)`.
pub fn stop_all(force: bool, timeout: Duration) {
    Registry::global().stop_all(force, timeout);
}

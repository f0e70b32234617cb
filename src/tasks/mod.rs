//! # Task abstractions: status machine, outcomes, variants, builder.
//!
//! This module provides the task-facing types:
//! - [`Task`] / [`TaskRef`] - the shared control surface and its handle
//! - [`RepeatingTask`] - invoke the function until told to stop
//! - [`OnceTask`] - invoke the function exactly once, wait for the result
//! - [`TaskBuilder`] - fluent construction and auto-start sugar
//! - [`TaskStatus`], [`Signal`], [`TaskOutcome`] - the data model

pub(crate) mod base;
mod builder;
mod once;
mod outcome;
mod repeating;
mod status;
mod task;

pub use builder::TaskBuilder;
pub use once::OnceTask;
pub use outcome::TaskOutcome;
pub use repeating::RepeatingTask;
pub use status::{Signal, TaskStatus};
pub use task::{Task, TaskRef};

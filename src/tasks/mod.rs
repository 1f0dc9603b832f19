//! # Task abstractions.
//!
//! This module provides the core task-related types:
//! - [`Task`] - trait for implementing async tasks
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task<T>>`)
//! - [`TaskFn`] - function-backed task implementation
//! - [`Gated`] - predicate gate around a task
//! - [`TaskOptions`] - predicate and decorators attached to a registration

mod gated;
mod options;
mod task;
mod task_fn;

pub use gated::Gated;
pub use options::TaskOptions;
pub use task::{Predicate, Task, TaskRef};
pub use task_fn::TaskFn;

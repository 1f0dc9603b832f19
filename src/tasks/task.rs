//! # Task abstraction.
//!
//! This module defines the [`Task`] trait: an async unit of work executed once per
//! action occurrence. The common handle type is [`TaskRef`], an `Arc<dyn Task<T>>`
//! suitable for sharing between the registry, pipelines and event subscriptions.
//!
//! Decorators, gates and pipelines all implement [`Task`] themselves, so a subscriber
//! never needs to know what it is actually running.

use std::any::TypeId;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::events::{ActionData, ActionEventArgs};

/// Shared handle to a task.
pub type TaskRef<T> = Arc<dyn Task<T>>;

/// Predicate deciding whether a task runs for an occurrence.
pub type Predicate<T> = Arc<dyn Fn(&ActionEventArgs<T>) -> bool + Send + Sync>;

/// # Asynchronous unit of work.
///
/// A `Task` has a stable [`name`](Task::name), a runtime [`task_type`](Task::task_type)
/// used for type-based lookups in pipelines, and an async [`execute`](Task::execute)
/// that receives the occurrence arguments.
///
/// Long-running tasks should observe [`ActionEventArgs::token`] and return
/// [`TaskError::Canceled`] promptly once it fires.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use actionvisor::{ActionEventArgs, Task, TaskError};
///
/// struct SendWelcome;
///
/// #[async_trait]
/// impl Task<String> for SendWelcome {
///     async fn execute(&self, args: &ActionEventArgs<String>) -> Result<(), TaskError> {
///         if args.is_cancelled() {
///             return Err(TaskError::Canceled);
///         }
///         args.shared().insert("welcomed", args.data().clone());
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task<T: ActionData>: Send + Sync + 'static {
    /// Returns a human-readable task name.
    ///
    /// The default uses `type_name::<Self>()`; wrappers forward to the task they wrap.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Returns the runtime type of this task.
    ///
    /// Pipelines use it to find tasks by type for removal and replacement.
    fn task_type(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    /// Executes the task for one occurrence.
    async fn execute(&self, args: &ActionEventArgs<T>) -> Result<(), TaskError>;
}

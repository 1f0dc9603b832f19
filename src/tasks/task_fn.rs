//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: Fn(ActionEventArgs<T>) -> Fut`, producing a fresh
//! future per execution. The closure receives a cheap clone of the occurrence
//! arguments, so the future owns everything it touches.
//!
//! ## Concurrency semantics
//! - Each call to [`Task::execute`] creates a **new** future.
//! - No hidden mutation between executions; shared state goes through an explicit
//!   `Arc<...>` captured by the closure, or through [`ActionEventArgs::shared`].
//!
//! ## Example
//! ```rust
//! use actionvisor::{ActionEventArgs, TaskError, TaskFn, TaskRef};
//!
//! let t: TaskRef<u32> = TaskFn::arc("audit", |args: ActionEventArgs<u32>| async move {
//!     args.shared().insert("audited", *args.data());
//!     Ok::<_, TaskError>(())
//! });
//!
//! assert_eq!(t.name(), "audit");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::events::{ActionData, ActionEventArgs};
use crate::tasks::task::Task;

/// Function-backed task implementation.
pub struct TaskFn<T, F> {
    name: Cow<'static, str>,
    f: F,
    _data: PhantomData<fn(T)>,
}

impl<T, F> TaskFn<T, F> {
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::arc`] when you immediately need a [`TaskRef`](crate::TaskRef).
    pub fn new<Fut>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(ActionEventArgs<T>) -> Fut,
        Fut: Future<Output = Result<(), TaskError>>,
    {
        Self {
            name: name.into(),
            f,
            _data: PhantomData,
        }
    }

    /// Creates the task and returns it as a shared handle.
    pub fn arc<Fut>(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self>
    where
        F: Fn(ActionEventArgs<T>) -> Fut,
        Fut: Future<Output = Result<(), TaskError>>,
    {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<T, F, Fut> Task<T> for TaskFn<T, F>
where
    T: ActionData,
    F: Fn(ActionEventArgs<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, args: &ActionEventArgs<T>) -> Result<(), TaskError> {
        (self.f)(args.clone()).await
    }
}

//! # Predicate gate.
//!
//! [`Gated`] is what the registry actually subscribes to an action event for profile
//! entries and direct bindings: it evaluates the stored predicate against the
//! occurrence and, only if it passes, runs the (possibly decorated) task.
//! A missing predicate means "always run".

use std::any::TypeId;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::events::{ActionData, ActionEventArgs};
use crate::tasks::task::{Predicate, Task, TaskRef};

/// Task that runs `inner` only when `predicate` admits the occurrence.
pub struct Gated<T> {
    inner: TaskRef<T>,
    predicate: Option<Predicate<T>>,
}

impl<T: ActionData> Gated<T> {
    /// Wraps `inner` behind `predicate`.
    pub fn new(inner: TaskRef<T>, predicate: Option<Predicate<T>>) -> Self {
        Self { inner, predicate }
    }

    /// Wraps and returns a shared handle.
    pub fn arc(inner: TaskRef<T>, predicate: Option<Predicate<T>>) -> TaskRef<T> {
        Arc::new(Self::new(inner, predicate))
    }

    /// Returns `true` if the occurrence passes the gate.
    #[inline]
    pub fn admits(&self, args: &ActionEventArgs<T>) -> bool {
        self.predicate.as_ref().map_or(true, |p| p(args))
    }
}

#[async_trait]
impl<T: ActionData> Task<T> for Gated<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn task_type(&self) -> TypeId {
        self.inner.task_type()
    }

    async fn execute(&self, args: &ActionEventArgs<T>) -> Result<(), TaskError> {
        if !self.admits(args) {
            tracing::trace!(task = self.inner.name(), "predicate rejected occurrence");
            return Ok(());
        }
        self.inner.execute(args).await
    }
}

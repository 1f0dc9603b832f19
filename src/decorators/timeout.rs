//! # Timeout decorator.
//!
//! Bounds a single invocation of the wrapped task with `tokio::time::timeout`.
//! A zero duration disables the bound.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time;

use crate::error::TaskError;
use crate::events::{ActionData, ActionEventArgs};
use crate::tasks::{Task, TaskRef};

/// Decorator that fails the wrapped task with [`TaskError::Timeout`] when it runs too long.
pub struct TimeoutDecorator<T> {
    inner: TaskRef<T>,
    timeout: Duration,
}

impl<T: ActionData> TimeoutDecorator<T> {
    /// Wraps `inner` with a per-invocation bound.
    pub fn new(inner: TaskRef<T>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl<T: ActionData> Task<T> for TimeoutDecorator<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn execute(&self, args: &ActionEventArgs<T>) -> Result<(), TaskError> {
        if self.timeout.is_zero() {
            return self.inner.execute(args).await;
        }
        match time::timeout(self.timeout, self.inner.execute(args)).await {
            Ok(res) => res,
            Err(_elapsed) => {
                tracing::warn!(
                    task = self.inner.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "task timed out"
                );
                Err(TaskError::Timeout {
                    timeout: self.timeout,
                })
            }
        }
    }
}

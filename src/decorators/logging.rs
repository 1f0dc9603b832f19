//! # Logging decorator.
//!
//! Emits `tracing` events around the wrapped task:
//!
//! ```text
//! INFO  starting task execution  task="SendWelcome" data=User { .. }
//! ERROR task execution failed    task="SendWelcome" error="execution failed: smtp down"
//! INFO  finished task execution  task="SendWelcome" elapsed_ms=12 ok=false
//! ```
//!
//! The inner result is returned unchanged; failures are logged, never swallowed.

use std::time::Instant;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::events::{ActionData, ActionEventArgs};
use crate::tasks::{Task, TaskRef};

/// Decorator that logs start, payload snapshot, elapsed time and outcome.
pub struct LoggingDecorator<T> {
    inner: TaskRef<T>,
}

impl<T: ActionData> LoggingDecorator<T> {
    /// Wraps `inner`.
    pub fn new(inner: TaskRef<T>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: ActionData> Task<T> for LoggingDecorator<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn execute(&self, args: &ActionEventArgs<T>) -> Result<(), TaskError> {
        let task = self.inner.name();
        tracing::info!(task, data = ?args.data(), "starting task execution");

        let started = Instant::now();
        let res = self.inner.execute(args).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if let Err(e) = &res {
            tracing::error!(task, error = %e, label = e.as_label(), "task execution failed");
        }
        tracing::info!(task, elapsed_ms, ok = res.is_ok(), "finished task execution");
        res
    }
}

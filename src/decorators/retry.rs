//! # Retry decorator.
//!
//! Re-invokes the wrapped task per [`RetryPolicy`]:
//!
//! ```text
//! loop {
//!   ├─► attempt += 1
//!   ├─► inner.execute(args)
//!   │       ├─ Ok  ──► return Ok
//!   │       └─ Err ──► not Canceled && attempt <= max_retries ?
//!   │                    ├─ yes ─► sleep(policy.delay_for(attempt - 1)) (cancellable)
//!   │                    └─ no  ─► return the error unchanged
//! }
//! ```
//!
//! ## Rules
//! - At most `max_retries + 1` invocations per occurrence.
//! - Every error is retried, `Fatal` included; only [`TaskError::Canceled`]
//!   propagates immediately.
//! - Cancelling the occurrence token during a sleep returns [`TaskError::Canceled`].

use async_trait::async_trait;
use tokio::{select, time};

use crate::error::TaskError;
use crate::events::{ActionData, ActionEventArgs};
use crate::policies::RetryPolicy;
use crate::tasks::{Task, TaskRef};

/// Decorator that retries the wrapped task.
pub struct RetryDecorator<T> {
    inner: TaskRef<T>,
    policy: RetryPolicy,
}

impl<T: ActionData> RetryDecorator<T> {
    /// Wraps `inner` with `policy`.
    pub fn new(inner: TaskRef<T>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// The policy in effect.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<T: ActionData> Task<T> for RetryDecorator<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn execute(&self, args: &ActionEventArgs<T>) -> Result<(), TaskError> {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let err = match self.inner.execute(args).await {
                Ok(()) => return Ok(()),
                Err(e) => e,
            };
            if matches!(err, TaskError::Canceled) || attempt > self.policy.max_retries {
                return Err(err);
            }

            let delay = self.policy.delay_for(attempt - 1);
            tracing::debug!(
                task = self.inner.name(),
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "retry scheduled"
            );

            let sleep = time::sleep(delay);
            tokio::pin!(sleep);
            select! {
                _ = &mut sleep => {}
                _ = args.token().cancelled() => return Err(TaskError::Canceled),
            }
        }
    }
}

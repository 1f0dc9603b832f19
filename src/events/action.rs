//! # Action events.
//!
//! An [`ActionEvent`] is the notification point exposed by an action: tasks subscribe
//! to it and run every time it fires.
//!
//! ```text
//! fire(data)
//!     │  snapshot subscribers (read lock released before any task runs)
//!     ▼
//! ┌────────────┐   Sequential: one after another, in subscription order
//! │ subscriber │   Concurrent: all at once (futures::join_all)
//! │ subscriber │
//! │ subscriber │──► failures collected ──► DispatchError::SubscribersFailed
//! └────────────┘
//! ```
//!
//! ## Rules
//! - Every subscriber runs for every occurrence, even when an earlier one fails.
//! - A panicking subscriber is reported as [`TaskError::Fatal`]; the others still run.
//! - All subscribers of one occurrence share the same [`ActionEventArgs`].
//! - Subscribing or unsubscribing during a fire affects only later occurrences.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use futures::future::join_all;
use futures::FutureExt;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::args::{ActionData, ActionEventArgs};
use super::subscription::Subscription;
use crate::error::{DispatchError, TaskError};
use crate::policies::FanOut;
use crate::tasks::TaskRef;

/// Global sequence for subscription ids.
static SUBSCRIPTION_SEQ: AtomicU64 = AtomicU64::new(1);

/// Anything that exposes an [`ActionEvent`] and can be linked by the manager.
///
/// `profile_name` lets an action carry its own profile; an explicit profile passed to
/// [`TaskManager::link`](crate::TaskManager::link) takes precedence.
pub trait ActionTrigger: Send + Sync + 'static {
    /// Payload carried by every occurrence.
    type Data: ActionData;

    /// The event tasks are subscribed to.
    fn action_event(&self) -> &ActionEvent<Self::Data>;

    /// Profile to link when none is given explicitly.
    fn profile_name(&self) -> Option<&str> {
        None
    }
}

pub(crate) struct Slot<T> {
    pub(crate) id: u64,
    pub(crate) task: TaskRef<T>,
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            task: Arc::clone(&self.task),
        }
    }
}

/// Subscriber list of one action.
///
/// Cloning yields another handle to the same list.
pub struct ActionEvent<T> {
    slots: Arc<RwLock<Vec<Slot<T>>>>,
    fan_out: FanOut,
}

impl<T> Clone for ActionEvent<T> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
            fan_out: self.fan_out,
        }
    }
}

impl<T: ActionData> Default for ActionEvent<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActionData> ActionEvent<T> {
    /// Event with sequential fan-out.
    pub fn new() -> Self {
        Self::with_fan_out(FanOut::default())
    }

    pub fn with_fan_out(fan_out: FanOut) -> Self {
        Self {
            slots: Arc::new(RwLock::new(Vec::new())),
            fan_out,
        }
    }

    pub fn fan_out(&self) -> FanOut {
        self.fan_out
    }

    /// Attaches `task`; it runs on every later occurrence until unsubscribed.
    pub async fn subscribe(&self, task: TaskRef<T>) -> Subscription<T> {
        let id = SUBSCRIPTION_SEQ.fetch_add(1, AtomicOrdering::Relaxed);
        self.slots.write().await.push(Slot { id, task });
        Subscription::new(id, Arc::downgrade(&self.slots))
    }

    pub async fn subscriber_count(&self) -> usize {
        self.slots.read().await.len()
    }

    /// Fires one occurrence carrying `data`.
    pub async fn fire(&self, data: T) -> Result<(), DispatchError> {
        self.fire_args(ActionEventArgs::new(data)).await
    }

    /// Fires one occurrence that can be aborted through `token`.
    pub async fn fire_with_token(
        &self,
        data: T,
        token: CancellationToken,
    ) -> Result<(), DispatchError> {
        self.fire_args(ActionEventArgs::with_token(data, token)).await
    }

    /// Fires one occurrence with prepared arguments.
    pub async fn fire_args(&self, args: ActionEventArgs<T>) -> Result<(), DispatchError> {
        let snapshot: Vec<Slot<T>> = self.slots.read().await.clone();
        if snapshot.is_empty() {
            return Ok(());
        }

        let failures: Vec<TaskError> = match self.fan_out {
            FanOut::Sequential => {
                let mut failures = Vec::new();
                for slot in &snapshot {
                    if let Err(e) = run_isolated(&slot.task, &args).await {
                        failures.push(e);
                    }
                }
                failures
            }
            FanOut::Concurrent => join_all(snapshot.iter().map(|s| run_isolated(&s.task, &args)))
                .await
                .into_iter()
                .filter_map(Result::err)
                .collect(),
        };

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DispatchError::SubscribersFailed { failures })
        }
    }

    /// Fires in the background; failures are logged, never returned.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn emit(&self, data: T) -> JoinHandle<()> {
        let event = self.clone();
        tokio::spawn(async move {
            if let Err(e) = event.fire(data).await {
                tracing::warn!(error = %e, label = e.as_label(), "background occurrence failed");
            }
        })
    }
}

async fn run_isolated<T: ActionData>(
    task: &TaskRef<T>,
    args: &ActionEventArgs<T>,
) -> Result<(), TaskError> {
    match AssertUnwindSafe(task.execute(args)).catch_unwind().await {
        Ok(res) => {
            if let Err(e) = &res {
                tracing::debug!(task = task.name(), error = %e, "subscriber failed");
            }
            res
        }
        Err(_panic) => {
            tracing::error!(task = task.name(), "subscriber panicked");
            Err(TaskError::Fatal {
                error: format!("task '{}' panicked", task.name()),
            })
        }
    }
}

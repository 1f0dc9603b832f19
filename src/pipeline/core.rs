//! # Priority pipeline.
//!
//! A [`Pipeline`] owns a priority map of tasks and turns it into a fresh
//! [`ChainNode`] list on every run:
//!
//! ```text
//! execute_pipeline(args)
//!   ├─► on_started(data)
//!   ├─► transaction.begin
//!   ├─► read lock ─► snapshot (ascending priority) ─► unlock
//!   ├─► build chain ─► head.execute_chain(args, policy)
//!   ├─ Ok  ─► transaction.commit ─► on_completed(data)
//!   └─ Err ─► transaction.rollback ─► on_failed(data, err) ─► Err(err)
//! ```
//!
//! ## Rules
//! - Priorities are unique; iteration is ascending.
//! - The lock is never held while a task runs, so the map can be edited while a run is
//!   in flight; edits take effect on the next run.
//! - Exactly one of `on_completed` / `on_failed` fires per run.
//! - `Pipeline` is itself a [`Task`], so an `Arc<Pipeline<T>>` subscribes like any task.

use std::any::TypeId;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::chain::ChainNode;
use super::hooks::{NoTransaction, PipelineTransaction};
use crate::error::{DispatchError, TaskError};
use crate::events::{ActionData, ActionEventArgs};
use crate::policies::ChainPolicy;
use crate::tasks::{Predicate, Task, TaskRef};

type Notify<T> = Arc<dyn Fn(&T) + Send + Sync>;
type NotifyFailed<T> = Arc<dyn Fn(&T, &TaskError) + Send + Sync>;

/// Registered pipeline step.
struct ChainLink<T> {
    task: TaskRef<T>,
    predicate: Option<Predicate<T>>,
}

/// Priority-ordered chain of responsibility for one action type.
pub struct Pipeline<T: ActionData> {
    links: RwLock<BTreeMap<i32, ChainLink<T>>>,
    policy: ChainPolicy,
    on_started: Option<Notify<T>>,
    on_completed: Option<Notify<T>>,
    on_failed: Option<NotifyFailed<T>>,
    transaction: Arc<dyn PipelineTransaction<T>>,
}

impl<T: ActionData> Default for Pipeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActionData> Pipeline<T> {
    /// Empty pipeline with the default [`ChainPolicy`].
    pub fn new() -> Self {
        Self::with_policy(ChainPolicy::default())
    }

    pub fn with_policy(policy: ChainPolicy) -> Self {
        Self {
            links: RwLock::new(BTreeMap::new()),
            policy,
            on_started: None,
            on_completed: None,
            on_failed: None,
            transaction: Arc::new(NoTransaction),
        }
    }

    /// Called with the payload before every run.
    pub fn on_started(mut self, f: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_started = Some(Arc::new(f));
        self
    }

    /// Called with the payload after a successful run.
    pub fn on_completed(mut self, f: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_completed = Some(Arc::new(f));
        self
    }

    /// Called with the payload and the error after a failed run.
    pub fn on_failed(mut self, f: impl Fn(&T, &TaskError) + Send + Sync + 'static) -> Self {
        self.on_failed = Some(Arc::new(f));
        self
    }

    pub fn with_transaction(mut self, tx: Arc<dyn PipelineTransaction<T>>) -> Self {
        self.transaction = tx;
        self
    }

    pub fn policy(&self) -> ChainPolicy {
        self.policy
    }

    /// Inserts `task` at `priority`, gated by `predicate`.
    pub async fn register_task(
        &self,
        task: TaskRef<T>,
        priority: i32,
        predicate: Option<Predicate<T>>,
    ) -> Result<(), DispatchError> {
        let mut links = self.links.write().await;
        if links.contains_key(&priority) {
            return Err(DispatchError::DuplicatePriority { priority });
        }
        tracing::debug!(task = task.name(), priority, "pipeline task registered");
        links.insert(priority, ChainLink { task, predicate });
        Ok(())
    }

    /// Removes the lowest-priority task of type `K`.
    pub async fn remove_task<K: 'static>(&self) -> Result<(), DispatchError> {
        let mut links = self.links.write().await;
        let priority = Self::find::<K>(&links)?;
        links.remove(&priority);
        tracing::debug!(task = std::any::type_name::<K>(), priority, "pipeline task removed");
        Ok(())
    }

    /// Puts `task` in place of the lowest-priority task of type `K`, keeping its priority.
    ///
    /// The new step has no predicate.
    pub async fn replace_task<K: 'static>(&self, task: TaskRef<T>) -> Result<(), DispatchError> {
        let mut links = self.links.write().await;
        let priority = Self::find::<K>(&links)?;
        tracing::debug!(
            old = std::any::type_name::<K>(),
            new = task.name(),
            priority,
            "pipeline task replaced"
        );
        links.insert(
            priority,
            ChainLink {
                task,
                predicate: None,
            },
        );
        Ok(())
    }

    fn find<K: 'static>(links: &BTreeMap<i32, ChainLink<T>>) -> Result<i32, DispatchError> {
        let wanted = TypeId::of::<K>();
        links
            .iter()
            .find(|(_, link)| link.task.task_type() == wanted)
            .map(|(priority, _)| *priority)
            .ok_or(DispatchError::TaskNotFound {
                task: std::any::type_name::<K>(),
            })
    }

    pub async fn len(&self) -> usize {
        self.links.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.links.read().await.is_empty()
    }

    /// Registered priorities, ascending.
    pub async fn priorities(&self) -> Vec<i32> {
        self.links.read().await.keys().copied().collect()
    }

    /// Runs every step for one occurrence.
    pub async fn execute_pipeline(&self, args: &ActionEventArgs<T>) -> Result<(), TaskError> {
        tracing::info!(data = ?args.data(), "executing pipeline");
        if let Some(f) = &self.on_started {
            f(args.data());
        }

        match self.run(args).await {
            Ok(()) => {
                tracing::info!("pipeline completed");
                if let Some(f) = &self.on_completed {
                    f(args.data());
                }
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, label = e.as_label(), "pipeline failed");
                if let Some(f) = &self.on_failed {
                    f(args.data(), &e);
                }
                Err(e)
            }
        }
    }

    async fn run(&self, args: &ActionEventArgs<T>) -> Result<(), TaskError> {
        self.transaction.begin(args).await?;

        let steps: Vec<_> = {
            let links = self.links.read().await;
            links
                .iter()
                .map(|(p, l)| (*p, Arc::clone(&l.task), l.predicate.clone()))
                .collect()
        };

        let outcome = match ChainNode::link_all(steps.into_iter()) {
            Some(head) => head.execute_chain(args, self.policy).await,
            None => Ok(()),
        };
        let outcome = match outcome {
            Ok(()) => self.transaction.commit(args).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &outcome {
            self.transaction.rollback(args, e).await;
        }
        outcome
    }
}

#[async_trait]
impl<T: ActionData> Task<T> for Pipeline<T> {
    fn name(&self) -> &str {
        "pipeline"
    }

    async fn execute(&self, args: &ActionEventArgs<T>) -> Result<(), TaskError> {
        self.execute_pipeline(args).await
    }
}

impl<T: ActionData> fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

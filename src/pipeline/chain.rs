//! # Chain of responsibility.
//!
//! A pipeline run builds a singly linked list of [`ChainNode`]s in ascending priority
//! order and walks it:
//!
//! ```text
//! node(p=1) ──► node(p=2) ──► node(p=3) ──► end
//!    │             │             │
//!    └ admits? ─── └ admits? ─── └ admits?
//! ```
//!
//! ## Rules
//! - The head node runs only if its predicate admits the occurrence.
//! - A node's error stops the walk and is returned as-is.
//! - What happens after a rejected successor depends on [`ChainPolicy`]:
//!   `StopAtRejectedSuccessor` ends the run, `SkipRejected` moves on to the next node.
//! - The occurrence token is checked before every node; a cancelled token yields
//!   [`TaskError::Canceled`].
//! - Each predicate is evaluated at most once per node per run.

use crate::error::TaskError;
use crate::events::{ActionData, ActionEventArgs};
use crate::policies::ChainPolicy;
use crate::tasks::{Predicate, TaskRef};

/// One step of a pipeline run.
pub struct ChainNode<T> {
    task: TaskRef<T>,
    predicate: Option<Predicate<T>>,
    priority: i32,
    next: Option<Box<ChainNode<T>>>,
}

impl<T: ActionData> ChainNode<T> {
    pub fn new(task: TaskRef<T>, predicate: Option<Predicate<T>>, priority: i32) -> Self {
        Self {
            task,
            predicate,
            priority,
            next: None,
        }
    }

    /// Links `next` after this node, replacing any previous successor.
    pub fn set_next(&mut self, next: ChainNode<T>) {
        self.next = Some(Box::new(next));
    }

    pub fn next(&self) -> Option<&ChainNode<T>> {
        self.next.as_deref()
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn task(&self) -> &TaskRef<T> {
        &self.task
    }

    /// Whether this node's predicate lets the occurrence through.
    pub fn admits(&self, args: &ActionEventArgs<T>) -> bool {
        self.predicate.as_ref().map_or(true, |p| p(args))
    }

    /// Builds a chain from `(priority, task, predicate)` triples already in order.
    pub(crate) fn link_all(
        steps: impl DoubleEndedIterator<Item = (i32, TaskRef<T>, Option<Predicate<T>>)>,
    ) -> Option<ChainNode<T>> {
        let mut head: Option<ChainNode<T>> = None;
        for (priority, task, predicate) in steps.rev() {
            let mut node = ChainNode::new(task, predicate, priority);
            if let Some(next) = head.take() {
                node.set_next(next);
            }
            head = Some(node);
        }
        head
    }

    /// Walks the chain starting at this node.
    pub async fn execute_chain(
        &self,
        args: &ActionEventArgs<T>,
        policy: ChainPolicy,
    ) -> Result<(), TaskError> {
        let mut current = Some(self);
        let mut is_head = true;

        while let Some(node) = current {
            if args.is_cancelled() {
                return Err(TaskError::Canceled);
            }

            if node.admits(args) {
                node.task.execute(args).await?;
            } else {
                tracing::trace!(
                    task = node.task.name(),
                    priority = node.priority,
                    "pipeline step rejected"
                );
                if !is_head && policy == ChainPolicy::StopAtRejectedSuccessor {
                    return Ok(());
                }
            }

            is_head = false;
            current = node.next();
        }
        Ok(())
    }
}

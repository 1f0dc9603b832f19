//! # Pipeline transaction hooks.
//!
//! A [`PipelineTransaction`] brackets one pipeline run:
//!
//! ```text
//! begin ──► chain ──┬─ Ok  ──► commit
//!                   └─ Err ──► rollback(err) ──► error re-raised
//! ```
//!
//! The default for every method is a no-op, and [`NoTransaction`] is what pipelines
//! use until one is configured.

use async_trait::async_trait;

use crate::error::TaskError;
use crate::events::{ActionData, ActionEventArgs};

/// Begin/commit/rollback around one pipeline execution.
///
/// A failing `begin` aborts the run before any task executes. A failing `commit`
/// fails the run and triggers `rollback`.
#[async_trait]
pub trait PipelineTransaction<T: ActionData>: Send + Sync + 'static {
    async fn begin(&self, _args: &ActionEventArgs<T>) -> Result<(), TaskError> {
        Ok(())
    }

    async fn commit(&self, _args: &ActionEventArgs<T>) -> Result<(), TaskError> {
        Ok(())
    }

    async fn rollback(&self, _args: &ActionEventArgs<T>, _error: &TaskError) {}
}

/// Transaction that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTransaction;

impl<T: ActionData> PipelineTransaction<T> for NoTransaction {}

//! # Metrics decorator and sink.
//!
//! [`MetricsSink`] is the injected collector; [`MetricsDecorator`] times the wrapped
//! task and reports `"{task}.executionTime"` in milliseconds.
//!
//! ## Rules
//! - Only successful executions are reported; errors pass straight through.
//! - `collect` returns nothing, so a sink can never abort a task.
//!
//! ## Example
//! ```rust
//! use std::sync::Mutex;
//! use actionvisor::MetricsSink;
//!
//! #[derive(Default)]
//! struct Recorder(Mutex<Vec<(String, f64)>>);
//!
//! impl MetricsSink for Recorder {
//!     fn collect(&self, metric: &str, value: f64) {
//!         if let Ok(mut seen) = self.0.lock() {
//!             seen.push((metric.to_string(), value));
//!         }
//!     }
//! }
//! ```

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::events::{ActionData, ActionEventArgs};
use crate::tasks::{Task, TaskRef};

/// Destination for task timings.
pub trait MetricsSink: Send + Sync + 'static {
    /// Records one sample.
    fn collect(&self, metric: &str, value: f64);
}

/// Sink that drops every sample.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn collect(&self, _metric: &str, _value: f64) {}
}

/// Decorator that reports the wrapped task's execution time.
pub struct MetricsDecorator<T> {
    inner: TaskRef<T>,
    sink: Arc<dyn MetricsSink>,
}

impl<T: ActionData> MetricsDecorator<T> {
    /// Wraps `inner`, reporting to `sink`.
    pub fn new(inner: TaskRef<T>, sink: Arc<dyn MetricsSink>) -> Self {
        Self { inner, sink }
    }

    /// Metric name used for `task`.
    pub fn metric_name(task: &str) -> String {
        format!("{task}.executionTime")
    }
}

#[async_trait]
impl<T: ActionData> Task<T> for MetricsDecorator<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn execute(&self, args: &ActionEventArgs<T>) -> Result<(), TaskError> {
        let started = Instant::now();
        self.inner.execute(args).await?;
        let elapsed = started.elapsed().as_secs_f64() * 1000.0;

        self.sink.collect(&Self::metric_name(self.inner.name()), elapsed);
        Ok(())
    }
}

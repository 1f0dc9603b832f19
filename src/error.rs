//! Error types used by the dispatch registry and by tasks.
//!
//! This module defines two main error enums:
//!
//! - [`DispatchError`] - errors raised by the registry, pipelines and action events.
//! - [`TaskError`] - errors raised by individual task executions.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics
//! and additional utilities such as [`TaskError::is_retryable`].

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the dispatch machinery.
///
/// These represent failures of the registry itself (bad arguments, missing
/// pipelines or factories) and the aggregated outcome of firing an action.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    /// A required argument was empty.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Parameter name.
        name: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// The operation addressed an action type with no registered pipeline.
    #[error("no pipeline found for action type {action}")]
    PipelineNotFound {
        /// Type name of the action.
        action: &'static str,
    },

    /// A pipeline already holds a task at this priority.
    #[error("priority {priority} is already taken in this pipeline")]
    DuplicatePriority {
        /// The occupied priority key.
        priority: i32,
    },

    /// A pipeline holds no task of the requested type.
    #[error("no task of type {task} in pipeline")]
    TaskNotFound {
        /// Type name of the task.
        task: &'static str,
    },

    /// The task factory has no constructor for a bound task type.
    #[error("no constructor registered for task type {task}")]
    Unconstructible {
        /// Type name of the task.
        task: &'static str,
    },

    /// A custom decorator name is unknown to the task factory for this payload type.
    #[error("unknown decorator `{name}`")]
    UnknownDecorator {
        /// Decorator name.
        name: String,
    },

    /// One or more subscribers failed while handling an action occurrence.
    #[error("{} subscriber(s) failed; first: {}", .failures.len(), first_failure(.failures))]
    SubscribersFailed {
        /// Every failure, in subscriber order.
        failures: Vec<TaskError>,
    },
}

fn first_failure(failures: &[TaskError]) -> String {
    failures
        .first()
        .map(ToString::to_string)
        .unwrap_or_default()
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use actionvisor::DispatchError;
    ///
    /// let err = DispatchError::DuplicatePriority { priority: 3 };
    /// assert_eq!(err.as_label(), "dispatch_duplicate_priority");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::InvalidArgument { .. } => "dispatch_invalid_argument",
            DispatchError::PipelineNotFound { .. } => "dispatch_pipeline_not_found",
            DispatchError::DuplicatePriority { .. } => "dispatch_duplicate_priority",
            DispatchError::TaskNotFound { .. } => "dispatch_task_not_found",
            DispatchError::Unconstructible { .. } => "dispatch_unconstructible",
            DispatchError::UnknownDecorator { .. } => "dispatch_unknown_decorator",
            DispatchError::SubscribersFailed { .. } => "dispatch_subscribers_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DispatchError::InvalidArgument { name, reason } => format!("{name}: {reason}"),
            DispatchError::PipelineNotFound { action } => format!("pipeline missing: {action}"),
            DispatchError::DuplicatePriority { priority } => format!("priority taken: {priority}"),
            DispatchError::TaskNotFound { task } => format!("task missing: {task}"),
            DispatchError::Unconstructible { task } => format!("no constructor: {task}"),
            DispatchError::UnknownDecorator { name } => format!("unknown decorator: {name}"),
            DispatchError::SubscribersFailed { failures } => {
                let labels: Vec<&str> = failures.iter().map(TaskError::as_label).collect();
                format!("subscribers failed: {labels:?}")
            }
        }
    }

    /// Returns the task failures carried by [`DispatchError::SubscribersFailed`].
    ///
    /// Empty for every other variant.
    pub fn failures(&self) -> &[TaskError] {
        match self {
            DispatchError::SubscribersFailed { failures } => failures,
            _ => &[],
        }
    }
}

/// # Errors produced by task execution.
///
/// Some errors are retryable (`Timeout`, `Fail`), others are considered final.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Task execution exceeded its timeout duration.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// Non-recoverable error (never retried).
    #[error("fatal error (no retry): {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// Task execution failed but may succeed if retried.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The action occurrence was cancelled.
    #[error("occurrence cancelled")]
    Canceled,
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use actionvisor::TaskError;
    /// use std::time::Duration;
    ///
    /// let err = TaskError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "task_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Fatal { .. } => "task_fatal",
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            TaskError::Fatal { error } => format!("fatal: {error}"),
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Canceled => "occurrence cancelled".to_string(),
        }
    }

    /// Indicates whether the error type is safe to retry.
    ///
    /// Returns `true` for [`TaskError::Fail`] and [`TaskError::Timeout`],
    /// `false` otherwise.
    ///
    /// # Example
    /// ```
    /// use actionvisor::TaskError;
    ///
    /// let retryable = TaskError::Fail { error: "boom".into() };
    /// assert!(retryable.is_retryable());
    ///
    /// let fatal = TaskError::Fatal { error: "nope".into() };
    /// assert!(!fatal.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, TaskError::Fail { .. } | TaskError::Timeout { .. })
    }
}

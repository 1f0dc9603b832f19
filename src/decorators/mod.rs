//! # Task decorators.
//!
//! A decorator is a [`Task`](crate::Task) that owns exactly one inner task and forwards
//! execution to it around some cross-cutting behavior. Decorators nest:
//!
//! ```text
//! outer ──► middle ──► inner decorator ──► concrete task
//! ```
//!
//! Registrations refer to decorators by identifier ([`Decorator`]), never by value;
//! the [`TaskFactory`](crate::TaskFactory) turns identifiers into wrappers when a task
//! chain is built. Wrapping follows list order: each decorator wraps the result of
//! the previous ones, so the **last** identifier in a list is the outermost layer.
//!
//! ## Built-ins
//! | Identifier              | Wrapper              | Behavior                                   |
//! |-------------------------|----------------------|--------------------------------------------|
//! | [`Decorator::Logging`]  | [`LoggingDecorator`] | `tracing` start / elapsed / failure events |
//! | [`Decorator::Metrics`]  | [`MetricsDecorator`] | `"{task}.executionTime"` to a [`MetricsSink`] |
//! | [`Decorator::Retry`]    | [`RetryDecorator`]   | re-invokes on any error but cancellation   |
//! | [`Decorator::Timeout`]  | [`TimeoutDecorator`] | bounds one invocation                      |
//! | [`Decorator::Custom`]   | factory-provided     | resolved by name per payload type          |

mod logging;
mod metrics;
mod retry;
mod timeout;

pub use logging::LoggingDecorator;
pub use metrics::{MetricsDecorator, MetricsSink, NoopMetrics};
pub use retry::RetryDecorator;
pub use timeout::TimeoutDecorator;

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use crate::error::DispatchError;
use crate::policies::RetryPolicy;

/// Identifier of a wrapping behavior.
#[derive(Clone, Debug, PartialEq)]
pub enum Decorator {
    /// Wrap with [`LoggingDecorator`].
    Logging,
    /// Wrap with [`MetricsDecorator`] reporting to the factory's sink.
    Metrics,
    /// Wrap with [`RetryDecorator`].
    Retry(RetryPolicy),
    /// Wrap with [`TimeoutDecorator`].
    Timeout(Duration),
    /// Wrap with a decorator registered on the factory under this name.
    Custom(Cow<'static, str>),
}

impl Decorator {
    /// Custom decorator identifier.
    pub fn custom(name: impl Into<Cow<'static, str>>) -> Self {
        Decorator::Custom(name.into())
    }

    /// Retry with the default [`RetryPolicy`].
    pub fn retry() -> Self {
        Decorator::Retry(RetryPolicy::default())
    }

    /// Short label for logs.
    pub fn label(&self) -> &str {
        match self {
            Decorator::Logging => "logging",
            Decorator::Metrics => "metrics",
            Decorator::Retry(_) => "retry",
            Decorator::Timeout(_) => "timeout",
            Decorator::Custom(name) => name,
        }
    }

    /// Rejects identifiers that cannot name a decorator.
    pub(crate) fn validate(&self) -> Result<(), DispatchError> {
        match self {
            Decorator::Custom(name) if name.trim().is_empty() => {
                Err(DispatchError::InvalidArgument {
                    name: "decorator",
                    reason: "custom decorator name cannot be empty",
                })
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Decorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

//! # Registration options.
//!
//! [`TaskOptions`] bundles what a registration may attach to a task besides the task
//! itself: a gating predicate and an ordered list of [`Decorator`]s.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use actionvisor::{Decorator, RetryPolicy, TaskOptions};
//!
//! let opts = TaskOptions::<String>::default()
//!     .when(|args| !args.data().is_empty())
//!     .decorate(Decorator::Retry(RetryPolicy::fixed(2, Duration::from_millis(10))))
//!     .decorate(Decorator::Logging);
//!
//! assert_eq!(opts.decorators().len(), 2);
//! assert!(opts.predicate().is_some());
//! ```

use std::sync::Arc;

use crate::decorators::Decorator;
use crate::events::ActionEventArgs;
use crate::tasks::task::Predicate;

/// Predicate and decorators attached to one registration.
pub struct TaskOptions<T> {
    predicate: Option<Predicate<T>>,
    decorators: Vec<Decorator>,
}

impl<T> Default for TaskOptions<T> {
    fn default() -> Self {
        Self {
            predicate: None,
            decorators: Vec::new(),
        }
    }
}

impl<T> Clone for TaskOptions<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
            decorators: self.decorators.clone(),
        }
    }
}

impl<T> TaskOptions<T> {
    /// Gates the task behind `predicate`.
    pub fn when<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&ActionEventArgs<T>) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Gates the task behind an already shared predicate.
    pub fn with_predicate(mut self, predicate: Predicate<T>) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Appends one decorator.
    pub fn decorate(mut self, decorator: Decorator) -> Self {
        self.decorators.push(decorator);
        self
    }

    /// Appends several decorators, in order.
    pub fn decorate_all(mut self, decorators: impl IntoIterator<Item = Decorator>) -> Self {
        self.decorators.extend(decorators);
        self
    }

    /// Returns the predicate, if any.
    pub fn predicate(&self) -> Option<&Predicate<T>> {
        self.predicate.as_ref()
    }

    /// Returns the decorators in registration order.
    pub fn decorators(&self) -> &[Decorator] {
        &self.decorators
    }

    pub(crate) fn into_parts(self) -> (Option<Predicate<T>>, Vec<Decorator>) {
        (self.predicate, self.decorators)
    }
}

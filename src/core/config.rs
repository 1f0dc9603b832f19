//! # Registry configuration.
//!
//! Provides [`ManagerConfig`], the settings a [`TaskManager`](crate::TaskManager) is
//! built with.
//!
//! Config is used in two ways:
//! 1. **Linking**: `enable_logging_decorator` adds [`Decorator::Logging`] to the
//!    universal decorators the first time an action is linked.
//! 2. **Lazy pipelines**: pipelines created by
//!    `register_or_add_task_to_pipeline` use `chain_policy`.

use crate::decorators::Decorator;
use crate::policies::ChainPolicy;

/// Configuration for the task manager.
///
/// ## Field semantics
/// - `enable_logging_decorator`: wrap every linked task with the logging decorator
/// - `chain_policy`: traversal rule for pipelines the manager creates itself
///
/// Pipelines registered explicitly through `register_pipeline` keep their own policy.
#[derive(Clone, Debug)]
pub struct ManagerConfig {
    /// Appends [`Decorator::Logging`] to the universal decorators at link time.
    ///
    /// The append is idempotent; a logging decorator added by hand is not duplicated.
    pub enable_logging_decorator: bool,

    /// Chain policy for lazily created pipelines.
    pub chain_policy: ChainPolicy,
}

impl ManagerConfig {
    /// Decorator the manager adds to the universal list on link, if any.
    #[inline]
    pub fn link_decorator(&self) -> Option<Decorator> {
        self.enable_logging_decorator.then_some(Decorator::Logging)
    }
}

impl Default for ManagerConfig {
    /// Default configuration:
    ///
    /// - `enable_logging_decorator = false`
    /// - `chain_policy = ChainPolicy::StopAtRejectedSuccessor`
    fn default() -> Self {
        Self {
            enable_logging_decorator: false,
            chain_policy: ChainPolicy::default(),
        }
    }
}

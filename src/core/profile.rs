use std::marker::PhantomData;

use super::manager::TaskManager;
use crate::error::DispatchError;
use crate::events::ActionData;
use crate::tasks::{TaskOptions, TaskRef};

/// Fluent registration of several tasks under one profile.
///
/// Returned by [`TaskManager::register_profile_task`]; every call registers the task
/// immediately, so dropping the builder loses nothing.
///
/// ## Example
/// ```rust
/// use actionvisor::{ActionEventArgs, TaskFn, TaskManager, TaskOptions};
///
/// let mut manager = TaskManager::new();
/// manager
///     .register_profile_task::<String>(
///         "signup",
///         TaskFn::arc("welcome", |_a: ActionEventArgs<String>| async { Ok(()) }),
///         TaskOptions::default(),
///     )?
///     .register(
///         TaskFn::arc("audit", |_a: ActionEventArgs<String>| async { Ok(()) }),
///         TaskOptions::<String>::default().when(|a| a.data().contains('@')),
///     )?;
///
/// assert_eq!(manager.profile_len("signup"), 2);
/// # Ok::<(), actionvisor::DispatchError>(())
/// ```
pub struct ProfileTaskBuilder<'a, T> {
    profile: String,
    manager: &'a mut TaskManager,
    _data: PhantomData<fn(T)>,
}

impl<'a, T: ActionData> ProfileTaskBuilder<'a, T> {
    pub(crate) fn new(profile: String, manager: &'a mut TaskManager) -> Self {
        Self {
            profile,
            manager,
            _data: PhantomData,
        }
    }

    /// Profile the builder registers under.
    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Registers another task under the same profile.
    pub fn register(self, task: TaskRef<T>, opts: TaskOptions<T>) -> Result<Self, DispatchError> {
        self.manager.push_profile_entry(&self.profile, task, opts)?;
        Ok(self)
    }
}

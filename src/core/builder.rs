use super::config::ManagerConfig;
use super::factory::TaskFactory;
use super::manager::TaskManager;

/// Builder for constructing a [`TaskManager`] with optional collaborators.
pub struct ManagerBuilder {
    cfg: ManagerConfig,
    factory: Option<TaskFactory>,
}

impl ManagerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: ManagerConfig) -> Self {
        Self { cfg, factory: None }
    }

    /// Sets the factory used to construct directly bound tasks and custom decorators.
    ///
    /// Without one, the manager starts with an empty [`TaskFactory`].
    pub fn with_factory(mut self, factory: TaskFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Builds the manager.
    pub fn build(self) -> TaskManager {
        TaskManager::new_internal(self.cfg, self.factory.unwrap_or_default())
    }
}

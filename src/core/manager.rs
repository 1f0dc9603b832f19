//! # Task manager: binding registry and linker.
//!
//! The [`TaskManager`] owns three independent binding tables plus the universal
//! decorator list:
//!
//! ```text
//! bindings  : action TypeId ──► [ (task TypeId, decorators, predicate), ... ]
//! profiles  : profile name  ──► [ (decorated task instance, predicate), ... ]
//! pipelines : action TypeId ──► Arc<Pipeline<Data>>
//! universal : [Decorator, ...]
//! ```
//!
//! Registration only fills tables. [`TaskManager::link`] reads them for one concrete
//! action and subscribes tasks to its event:
//!
//! ```text
//! link(action, profile)
//!   ├─► all tables empty? ─► Linkage::empty()
//!   ├─► logging enabled?  ─► universal += Logging (once)
//!   ├─► build chains (nothing subscribed yet):
//!   │     1. pipeline of the action type
//!   │     2. profile entries with matching payload ─► universal ─► Gated(predicate)
//!   │     3. direct bindings ─► factory.create ─► universal ++ binding ─► Gated(predicate)
//!   └─► subscribe every chain in that order ─► Linkage
//! ```
//!
//! ## Rules
//! - One direct binding per `(action type, task type)`; registering again replaces it in place.
//! - Profile entries are decorated with their own decorators at registration and with
//!   the universal decorators at link, so universal decorators sit outside them.
//! - Direct bindings are decorated at link with `universal ++ binding` decorators, so
//!   binding decorators sit outside the universal ones.
//! - A failing link subscribes nothing.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::builder::ManagerBuilder;
use super::config::ManagerConfig;
use super::factory::TaskFactory;
use super::profile::ProfileTaskBuilder;
use crate::decorators::Decorator;
use crate::error::DispatchError;
use crate::events::{ActionData, ActionTrigger, Linkage};
use crate::pipeline::Pipeline;
use crate::tasks::{Gated, Predicate, Task, TaskOptions, TaskRef};

/// Decorators and predicate of one direct binding, typed by payload.
struct TaskBinding<T> {
    decorators: Vec<Decorator>,
    predicate: Option<Predicate<T>>,
}

/// Direct binding with its payload type erased.
struct DirectBinding {
    task: TypeId,
    task_name: &'static str,
    inner: Box<dyn Any + Send + Sync>,
}

/// Task instance registered under a profile.
struct ProfileEntry<T> {
    task: TaskRef<T>,
    predicate: Option<Predicate<T>>,
}

/// Registry of action-to-task bindings.
pub struct TaskManager {
    cfg: ManagerConfig,
    factory: TaskFactory,
    universal: Vec<Decorator>,
    bindings: HashMap<TypeId, Vec<DirectBinding>>,
    profiles: HashMap<String, Vec<Box<dyn Any + Send + Sync>>>,
    pipelines: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskManager {
    /// Manager with default config and an empty factory.
    pub fn new() -> Self {
        Self::builder(ManagerConfig::default()).build()
    }

    /// Returns a builder for a manager with the given config.
    pub fn builder(cfg: ManagerConfig) -> ManagerBuilder {
        ManagerBuilder::new(cfg)
    }

    pub(crate) fn new_internal(cfg: ManagerConfig, factory: TaskFactory) -> Self {
        Self {
            cfg,
            factory,
            universal: Vec::new(),
            bindings: HashMap::new(),
            profiles: HashMap::new(),
            pipelines: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.cfg
    }

    pub fn factory(&self) -> &TaskFactory {
        &self.factory
    }

    /// Adds a decorator applied to every task linked from now on.
    ///
    /// Adding one that is already present is a no-op.
    pub fn add_universal_decorator(
        &mut self,
        decorator: Decorator,
    ) -> Result<&mut Self, DispatchError> {
        decorator.validate()?;
        self.push_universal(decorator);
        Ok(self)
    }

    fn push_universal(&mut self, decorator: Decorator) {
        if !self.universal.contains(&decorator) {
            tracing::debug!(decorator = %decorator, "universal decorator added");
            self.universal.push(decorator);
        }
    }

    pub fn universal_decorators(&self) -> &[Decorator] {
        &self.universal
    }

    /// Binds task type `K` to action type `A`.
    ///
    /// `K` is built through the factory on every link. Registering the same pair
    /// again replaces the previous options.
    pub fn register<A, K>(&mut self, opts: TaskOptions<A::Data>) -> Result<&mut Self, DispatchError>
    where
        A: ActionTrigger,
        K: Task<A::Data>,
    {
        for d in opts.decorators() {
            d.validate()?;
        }
        let (predicate, decorators) = opts.into_parts();
        let binding = DirectBinding {
            task: TypeId::of::<K>(),
            task_name: type_name::<K>(),
            inner: Box::new(TaskBinding::<A::Data> {
                decorators,
                predicate,
            }),
        };

        let list = self.bindings.entry(TypeId::of::<A>()).or_default();
        match list.iter_mut().find(|b| b.task == binding.task) {
            Some(existing) => *existing = binding,
            None => list.push(binding),
        }
        tracing::debug!(
            action = type_name::<A>(),
            task = type_name::<K>(),
            "task bound"
        );
        Ok(self)
    }

    /// Removes the binding of `K` to `A`, if any.
    pub fn unregister<A, K>(&mut self) -> &mut Self
    where
        A: ActionTrigger,
        K: 'static,
    {
        let action = TypeId::of::<A>();
        if let Some(list) = self.bindings.get_mut(&action) {
            list.retain(|b| b.task != TypeId::of::<K>());
            if list.is_empty() {
                self.bindings.remove(&action);
            }
            tracing::debug!(
                action = type_name::<A>(),
                task = type_name::<K>(),
                "task unbound"
            );
        }
        self
    }

    /// Number of direct bindings for `A`.
    pub fn binding_count<A: ActionTrigger>(&self) -> usize {
        self.bindings.get(&TypeId::of::<A>()).map_or(0, Vec::len)
    }

    /// Registers a task instance under `profile` and returns a builder for more.
    ///
    /// The entry's own decorators are applied right away.
    pub fn register_profile_task<T: ActionData>(
        &mut self,
        profile: &str,
        task: TaskRef<T>,
        opts: TaskOptions<T>,
    ) -> Result<ProfileTaskBuilder<'_, T>, DispatchError> {
        self.push_profile_entry(profile, task, opts)?;
        Ok(ProfileTaskBuilder::new(profile.to_string(), self))
    }

    pub(crate) fn push_profile_entry<T: ActionData>(
        &mut self,
        profile: &str,
        task: TaskRef<T>,
        opts: TaskOptions<T>,
    ) -> Result<(), DispatchError> {
        if profile.trim().is_empty() {
            return Err(DispatchError::InvalidArgument {
                name: "profile",
                reason: "profile name cannot be empty",
            });
        }
        for d in opts.decorators() {
            d.validate()?;
        }
        let (predicate, decorators) = opts.into_parts();
        let task = self.factory.decorate(task, &decorators)?;

        tracing::debug!(profile, task = task.name(), "profile task registered");
        self.profiles
            .entry(profile.to_string())
            .or_default()
            .push(Box::new(ProfileEntry { task, predicate }));
        Ok(())
    }

    /// Number of entries registered under `profile`, across payload types.
    pub fn profile_len(&self, profile: &str) -> usize {
        self.profiles.get(profile).map_or(0, Vec::len)
    }

    /// Sets the pipeline for `A`, replacing any previous one.
    pub fn register_pipeline<A: ActionTrigger>(
        &mut self,
        pipeline: Arc<Pipeline<A::Data>>,
    ) -> &mut Self {
        tracing::debug!(action = type_name::<A>(), "pipeline registered");
        self.pipelines.insert(TypeId::of::<A>(), Box::new(pipeline));
        self
    }

    /// Pipeline registered for `A`.
    pub fn pipeline<A: ActionTrigger>(&self) -> Option<Arc<Pipeline<A::Data>>> {
        self.pipelines
            .get(&TypeId::of::<A>())?
            .downcast_ref::<Arc<Pipeline<A::Data>>>()
            .cloned()
    }

    fn existing_pipeline<A: ActionTrigger>(&self) -> Result<Arc<Pipeline<A::Data>>, DispatchError> {
        self.pipeline::<A>()
            .ok_or(DispatchError::PipelineNotFound {
                action: type_name::<A>(),
            })
    }

    /// Adds `task` to the pipeline of `A` at `priority`, creating the pipeline first
    /// if needed.
    pub async fn register_or_add_task_to_pipeline<A: ActionTrigger>(
        &mut self,
        task: TaskRef<A::Data>,
        priority: i32,
    ) -> Result<&mut Self, DispatchError> {
        let pipeline = match self.pipeline::<A>() {
            Some(p) => p,
            None => {
                let p = Arc::new(Pipeline::with_policy(self.cfg.chain_policy));
                self.register_pipeline::<A>(Arc::clone(&p));
                p
            }
        };
        pipeline.register_task(task, priority, None).await?;
        Ok(self)
    }

    /// Removes the first task of type `K` from the pipeline of `A`.
    pub async fn remove_task_from_pipeline<A, K>(&mut self) -> Result<&mut Self, DispatchError>
    where
        A: ActionTrigger,
        K: 'static,
    {
        self.existing_pipeline::<A>()?.remove_task::<K>().await?;
        Ok(self)
    }

    /// Replaces the first task of type `K` in the pipeline of `A` with `task`.
    pub async fn replace_task_in_pipeline<A, K>(
        &mut self,
        task: TaskRef<A::Data>,
    ) -> Result<&mut Self, DispatchError>
    where
        A: ActionTrigger,
        K: 'static,
    {
        self.existing_pipeline::<A>()?
            .replace_task::<K>(task)
            .await?;
        Ok(self)
    }

    fn is_empty(&self) -> bool {
        self.bindings.is_empty() && self.profiles.is_empty() && self.pipelines.is_empty()
    }

    /// Subscribes everything registered for `action` to its event.
    ///
    /// `profile` overrides the action's own [`ActionTrigger::profile_name`]; an empty
    /// name links no profile.
    pub async fn link<A: ActionTrigger>(
        &mut self,
        action: &A,
        profile: Option<&str>,
    ) -> Result<Linkage<A::Data>, DispatchError> {
        if self.is_empty() {
            tracing::debug!(action = type_name::<A>(), "nothing registered; link skipped");
            return Ok(Linkage::empty());
        }
        if let Some(d) = self.cfg.link_decorator() {
            self.push_universal(d);
        }

        let profile = profile
            .or_else(|| action.profile_name())
            .filter(|p| !p.is_empty());
        let chains = self.build_chains::<A>(profile)?;

        let event = action.action_event();
        let mut linkage = Linkage::empty();
        for task in chains {
            linkage.push(event.subscribe(task).await);
        }
        tracing::debug!(
            action = type_name::<A>(),
            profile,
            subscribed = linkage.len(),
            "action linked"
        );
        Ok(linkage)
    }

    fn build_chains<A: ActionTrigger>(
        &self,
        profile: Option<&str>,
    ) -> Result<Vec<TaskRef<A::Data>>, DispatchError> {
        let mut chains: Vec<TaskRef<A::Data>> = Vec::new();

        if let Some(pipeline) = self.pipeline::<A>() {
            chains.push(pipeline);
        }

        let entries = profile.and_then(|p| self.profiles.get(p));
        for entry in entries.into_iter().flatten() {
            let Some(entry) = entry.downcast_ref::<ProfileEntry<A::Data>>() else {
                continue;
            };
            let task = self.factory.decorate(Arc::clone(&entry.task), &self.universal)?;
            chains.push(Gated::arc(task, entry.predicate.clone()));
        }

        let bindings = self.bindings.get(&TypeId::of::<A>());
        for binding in bindings.into_iter().flatten() {
            let Some(inner) = binding.inner.downcast_ref::<TaskBinding<A::Data>>() else {
                continue;
            };
            let task = self
                .factory
                .create::<A::Data>(binding.task)
                .ok_or(DispatchError::Unconstructible {
                    task: binding.task_name,
                })?;
            let decorators: Vec<Decorator> = self
                .universal
                .iter()
                .chain(&inner.decorators)
                .cloned()
                .collect();
            let task = self.factory.decorate(task, &decorators)?;
            chains.push(Gated::arc(task, inner.predicate.clone()));
        }

        Ok(chains)
    }
}

impl fmt::Debug for TaskManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskManager")
            .field("cfg", &self.cfg)
            .field("universal", &self.universal)
            .field("bindings", &self.bindings.len())
            .field("profiles", &self.profiles.len())
            .field("pipelines", &self.pipelines.len())
            .finish()
    }
}

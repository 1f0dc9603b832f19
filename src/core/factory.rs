//! # Task factory.
//!
//! The registry never constructs tasks on its own. A [`TaskFactory`] holds explicit
//! constructor closures keyed by task type, named custom decorators keyed by
//! `(name, payload type)`, and the [`MetricsSink`] fed by [`Decorator::Metrics`].
//!
//! ```text
//! link ──► create::<T>(task TypeId) ──► fresh TaskRef<T>
//!      └─► decorate(task, [d1, d2, d3]) ──► d3(d2(d1(task)))
//! ```
//!
//! ## Example
//! ```rust
//! use actionvisor::{TaskFactory, TaskRef};
//!
//! let factory = TaskFactory::new()
//!     .with_decorator::<String, _>("audit", |inner: TaskRef<String>| inner);
//!
//! assert!(factory.has_decorator::<String>("audit"));
//! assert!(!factory.has_decorator::<u64>("audit"));
//! ```

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::decorators::{
    Decorator, LoggingDecorator, MetricsDecorator, MetricsSink, NoopMetrics, RetryDecorator,
    TimeoutDecorator,
};
use crate::error::DispatchError;
use crate::events::ActionData;
use crate::tasks::{Task, TaskRef};

type Ctor<T> = Arc<dyn Fn() -> TaskRef<T> + Send + Sync>;
type Wrap<T> = Arc<dyn Fn(TaskRef<T>) -> TaskRef<T> + Send + Sync>;

/// Constructors for bound tasks and custom decorators.
#[derive(Clone)]
pub struct TaskFactory {
    tasks: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    decorators: HashMap<(Cow<'static, str>, TypeId), Arc<dyn Any + Send + Sync>>,
    metrics: Arc<dyn MetricsSink>,
}

impl Default for TaskFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskFactory {
    /// Empty factory reporting metrics to [`NoopMetrics`].
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
            decorators: HashMap::new(),
            metrics: Arc::new(NoopMetrics),
        }
    }

    /// Registers how to build a fresh `K` for payload `T`.
    ///
    /// The constructor runs once per link; each link gets its own instance.
    pub fn with_task<T, K, F>(mut self, ctor: F) -> Self
    where
        T: ActionData,
        K: Task<T>,
        F: Fn() -> K + Send + Sync + 'static,
    {
        let ctor: Ctor<T> = Arc::new(move || Arc::new(ctor()) as TaskRef<T>);
        self.tasks.insert(TypeId::of::<K>(), Arc::new(ctor));
        self
    }

    /// Registers `K::default` as the constructor of `K`.
    pub fn with_default<T, K>(self) -> Self
    where
        T: ActionData,
        K: Task<T> + Default,
    {
        self.with_task::<T, K, _>(K::default)
    }

    /// Registers a named decorator for payload `T`.
    ///
    /// The same name may be registered for several payload types.
    pub fn with_decorator<T, F>(mut self, name: impl Into<Cow<'static, str>>, wrap: F) -> Self
    where
        T: ActionData,
        F: Fn(TaskRef<T>) -> TaskRef<T> + Send + Sync + 'static,
    {
        let wrap: Wrap<T> = Arc::new(wrap);
        self.decorators
            .insert((name.into(), TypeId::of::<T>()), Arc::new(wrap));
        self
    }

    /// Sets the sink fed by [`Decorator::Metrics`].
    pub fn with_metrics(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.metrics = sink;
        self
    }

    pub fn has_task<K: 'static>(&self) -> bool {
        self.tasks.contains_key(&TypeId::of::<K>())
    }

    pub fn has_decorator<T: ActionData>(&self, name: &str) -> bool {
        self.lookup_decorator::<T>(name).is_some()
    }

    /// Builds a new instance of the task type `task` for payload `T`.
    ///
    /// Returns `None` if no constructor is registered or it was registered for
    /// another payload type.
    pub fn create<T: ActionData>(&self, task: TypeId) -> Option<TaskRef<T>> {
        let ctor = self.tasks.get(&task)?.downcast_ref::<Ctor<T>>()?;
        Some(ctor())
    }

    /// Wraps `task` with `decorators` in list order; the last one ends up outermost.
    pub fn decorate<T: ActionData>(
        &self,
        task: TaskRef<T>,
        decorators: &[Decorator],
    ) -> Result<TaskRef<T>, DispatchError> {
        let mut task = task;
        for d in decorators {
            let outer: TaskRef<T> = match d {
                Decorator::Logging => Arc::new(LoggingDecorator::new(task)),
                Decorator::Metrics => {
                    Arc::new(MetricsDecorator::new(task, Arc::clone(&self.metrics)))
                }
                Decorator::Retry(policy) => Arc::new(RetryDecorator::new(task, *policy)),
                Decorator::Timeout(timeout) => Arc::new(TimeoutDecorator::new(task, *timeout)),
                Decorator::Custom(name) => {
                    let wrap = self.lookup_decorator::<T>(name).ok_or_else(|| {
                        DispatchError::UnknownDecorator {
                            name: name.to_string(),
                        }
                    })?;
                    wrap(task)
                }
            };
            task = outer;
        }
        Ok(task)
    }

    fn lookup_decorator<T: ActionData>(&self, name: &str) -> Option<&Wrap<T>> {
        self.decorators
            .get(&(Cow::Owned(name.to_string()), TypeId::of::<T>()))?
            .downcast_ref::<Wrap<T>>()
    }
}

impl fmt::Debug for TaskFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskFactory")
            .field("tasks", &self.tasks.len())
            .field("decorators", &self.decorators.len())
            .finish_non_exhaustive()
    }
}

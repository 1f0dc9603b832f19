//! # actionvisor
//!
//! **Actionvisor** is an in-process action-to-task dispatch library for Rust.
//!
//! Applications raise *actions* (a signup, an order, a file upload). Each action
//! exposes an [`ActionEvent`]; the [`TaskManager`] decides which *tasks* run when that
//! event fires, in which order, wrapped in which cross-cutting behaviors, and under
//! which conditions.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  register::<A, K>()     register_profile_task()     register_or_add_task_to_pipeline()
//!         │                        │                               │
//!         ▼                        ▼                               ▼
//! ┌───────────────────────────────────────────────────────────────────────────┐
//! │  TaskManager (binding registry)                                           │
//! │  - direct bindings   : action type ──► task types (+decorators, predicate)│
//! │  - profiles          : name ──► task instances (+predicate)               │
//! │  - pipelines         : action type ──► Pipeline (priority map)            │
//! │  - universal decorators                                                   │
//! └──────────────────────────────────┬────────────────────────────────────────┘
//!                                    │ link(&action, profile)
//!                                    ▼
//!                   TaskFactory: create + decorate + Gated
//!                                    │
//!                                    ▼
//! ┌───────────────────────────────────────────────────────────────────────────┐
//! │  ActionEvent (subscriber list)                                            │
//! │   [pipeline] [profile task] [profile task] [bound task] ...               │
//! └──────────────────────────────────┬────────────────────────────────────────┘
//!                                    │ fire(data)
//!                                    ▼
//!         one ActionEventArgs per occurrence (data + SharedData + token)
//!                 shared by every subscriber of that occurrence
//! ```
//!
//! ### Decorator nesting
//! ```text
//! direct binding, universal = [U1], binding = [B1, B2]
//!
//!   Gated(predicate)
//!     └─► B2 ─► B1 ─► U1 ─► task
//!
//! profile entry, own = [P1], universal = [U1]
//!
//!   Gated(predicate)
//!     └─► U1 ─► P1 ─► task
//! ```
//!
//! ## Features
//! | Area            | Description                                                    | Key types / traits                                 |
//! |-----------------|----------------------------------------------------------------|----------------------------------------------------|
//! | **Registry**    | Bind tasks to action types, profiles and pipelines; link them. | [`TaskManager`], [`ProfileTaskBuilder`]             |
//! | **Actions**     | Subscribable events and per-occurrence arguments.              | [`ActionTrigger`], [`ActionEvent`], [`ActionEventArgs`] |
//! | **Pipelines**   | Priority-ordered chains of responsibility with hooks.          | [`Pipeline`], [`PipelineTransaction`]              |
//! | **Decorators**  | Logging, metrics, retry, timeout and named custom wrappers.    | [`Decorator`], [`TaskFactory`], [`MetricsSink`]     |
//! | **Policies**    | Retry delays, chain traversal and subscriber fan-out.          | [`RetryPolicy`], [`ChainPolicy`], [`FanOut`]        |
//! | **Errors**      | Typed errors for registry operations and task execution.       | [`DispatchError`], [`TaskError`]                   |
//! | **Tasks**       | Tasks as trait objects or closures.                            | [`Task`], [`TaskRef`], [`TaskFn`]                  |
//! | **Configuration** | Registry settings.                                           | [`ManagerConfig`]                                  |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use actionvisor::{
//!     ActionEvent, ActionEventArgs, ActionTrigger, Decorator, ManagerConfig, RetryPolicy,
//!     TaskFn, TaskManager, TaskOptions, TaskRef,
//! };
//!
//! struct UserRegistered {
//!     event: ActionEvent<String>,
//! }
//!
//! impl ActionTrigger for UserRegistered {
//!     type Data = String;
//!
//!     fn action_event(&self) -> &ActionEvent<String> {
//!         &self.event
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut manager = TaskManager::builder(ManagerConfig::default()).build();
//!     manager.add_universal_decorator(Decorator::Logging)?;
//!
//!     let welcome: TaskRef<String> = TaskFn::arc("welcome", |args: ActionEventArgs<String>| async move {
//!         println!("welcome, {}", args.data());
//!         Ok(())
//!     });
//!     let audit: TaskRef<String> = TaskFn::arc("audit", |args: ActionEventArgs<String>| async move {
//!         args.shared().insert("audited", true);
//!         Ok(())
//!     });
//!
//!     manager
//!         .register_or_add_task_to_pipeline::<UserRegistered>(audit, 1)
//!         .await?;
//!     manager.register_profile_task(
//!         "default",
//!         welcome,
//!         TaskOptions::<String>::default()
//!             .when(|args| !args.data().is_empty())
//!             .decorate(Decorator::Retry(RetryPolicy::fixed(2, Duration::from_millis(10)))),
//!     )?;
//!
//!     let action = UserRegistered { event: ActionEvent::new() };
//!     let linkage = manager.link(&action, Some("default")).await?;
//!     assert_eq!(linkage.len(), 2);
//!
//!     action.event.fire("ada".to_string()).await?;
//!     linkage.unlink().await;
//!     Ok(())
//! }
//! ```
mod core;
mod decorators;
mod error;
mod events;
mod pipeline;
mod policies;
mod tasks;

// ---- Public re-exports ----

pub use core::{ManagerBuilder, ManagerConfig, ProfileTaskBuilder, TaskFactory, TaskManager};
pub use decorators::{
    Decorator, LoggingDecorator, MetricsDecorator, MetricsSink, NoopMetrics, RetryDecorator,
    TimeoutDecorator,
};
pub use error::{DispatchError, TaskError};
pub use events::{
    ActionData, ActionEvent, ActionEventArgs, ActionTrigger, Linkage, SharedData, Subscription,
};
pub use pipeline::{ChainNode, NoTransaction, Pipeline, PipelineTransaction};
pub use policies::{ChainPolicy, FanOut, JitterPolicy, RetryPolicy};
pub use tasks::{Gated, Predicate, Task, TaskFn, TaskOptions, TaskRef};

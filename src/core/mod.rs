//! Registry core: bindings, profiles, pipelines and linking.
//!
//! The public API from this module is [`TaskManager`] (built directly or through
//! [`ManagerBuilder`]), its [`ManagerConfig`], the [`TaskFactory`] it constructs tasks
//! with, and the [`ProfileTaskBuilder`] returned by profile registration.
//!
//! Internal modules:
//! - [`manager`]: binding tables and `link`;
//! - [`factory`]: task constructors, custom decorators and the metrics sink;
//! - [`profile`]: fluent profile registration;
//! - [`builder`], [`config`]: construction and settings.
//!
//! ```text
//! register*/add_universal_decorator ──► TaskManager tables
//!                                            │
//! link(action, profile) ─────────────────────┘
//!     └─► TaskFactory (create + decorate) ─► Gated ─► ActionEvent::subscribe
//! ```

mod builder;
mod config;
mod factory;
mod manager;
mod profile;

pub use builder::ManagerBuilder;
pub use config::ManagerConfig;
pub use factory::TaskFactory;
pub use manager::TaskManager;
pub use profile::ProfileTaskBuilder;

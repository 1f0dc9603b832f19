//! Action events: notification points, per-occurrence arguments and subscription handles.
//!
//! ## Contents
//! - [`ActionTrigger`], [`ActionEvent`] what the registry links tasks to
//! - [`ActionEventArgs`], [`SharedData`] what every task of one occurrence receives
//! - [`Subscription`], [`Linkage`] handles for detaching linked tasks
//!
//! See `core/mod.rs` for how the registry wires tasks onto events.

mod action;
mod args;
mod subscription;

pub use action::{ActionEvent, ActionTrigger};
pub use args::{ActionData, ActionEventArgs, SharedData};
pub use subscription::{Linkage, Subscription};

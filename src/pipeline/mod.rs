//! Priority pipelines: ordered chains of responsibility bound to one action type.
//!
//! ## Contents
//! - [`Pipeline`] priority map + lifecycle callbacks + transaction hooks
//! - [`ChainNode`] run-local chain built from a snapshot of the map
//! - [`PipelineTransaction`], [`NoTransaction`] begin/commit/rollback hook points

mod chain;
mod core;
mod hooks;

pub use chain::ChainNode;
pub use core::Pipeline;
pub use hooks::{NoTransaction, PipelineTransaction};

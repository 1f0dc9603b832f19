//! Retry, traversal and fan-out policies.
//!
//! This module groups the knobs that control **how often** a decorated task is
//! retried, **how far** a pipeline walks past rejected steps, and **in which order**
//! subscribers of an action run.
//!
//! ## Contents
//! - [`RetryPolicy`]  retry bounds and delays (max retries / delay / factor / cap + jitter)
//! - [`JitterPolicy`] randomization strategy for retry delays
//! - [`ChainPolicy`]  pipeline behavior on a rejected step
//! - [`FanOut`]       sequential or concurrent subscriber execution
//!
//! ## Defaults
//! - `RetryPolicy::default()` → 3 retries, fixed 1s delay, no jitter.
//! - `ChainPolicy::StopAtRejectedSuccessor`.
//! - `FanOut::Sequential`.

mod chain;
mod jitter;
mod retry;

pub use chain::{ChainPolicy, FanOut};
pub use jitter::JitterPolicy;
pub use retry::RetryPolicy;

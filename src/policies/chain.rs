//! # Chain traversal and fan-out policies.
//!
//! [`ChainPolicy`] decides what a pipeline does when a step's predicate rejects the
//! occurrence. [`FanOut`] decides how an action event drives its subscribers.
//!
//! ## Chain traversal
//! ```text
//! priorities:      1 ──► 2 (rejected) ──► 3
//!
//! StopAtRejectedSuccessor:  1 runs, chain stops before 2, 3 never runs
//! SkipRejected:             1 runs, 2 skipped, 3 runs
//! ```
//! A rejected **head** is always skipped and the chain continues; the stop only
//! applies when a running node looks ahead at its successor.

/// Pipeline behavior when a step's predicate rejects the occurrence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChainPolicy {
    /// A node checks its successor's predicate before handing over; a rejection ends
    /// the traversal (default).
    #[default]
    StopAtRejectedSuccessor,
    /// Every node gates only itself; traversal always advances.
    SkipRejected,
}

/// How an action event drives its subscribers for one occurrence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FanOut {
    /// Await each subscriber in subscription order (default).
    #[default]
    Sequential,
    /// Poll every subscriber together and wait for all of them.
    Concurrent,
}

//! # Retry policy for the retry decorator.
//!
//! [`RetryPolicy`] bounds how often a failing task is re-invoked and how long the
//! decorator sleeps between attempts. It is parameterized by:
//! - [`RetryPolicy::max_retries`] extra attempts after the first one;
//! - [`RetryPolicy::delay`] the delay before the first retry;
//! - [`RetryPolicy::factor`] multiplicative growth (`1.0` keeps the delay fixed);
//! - [`RetryPolicy::max_delay`] the cap applied after growth;
//! - [`RetryPolicy::jitter`] randomization applied to the capped delay.
//!
//! The default is a fixed one second delay with three retries and no jitter.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use actionvisor::{JitterPolicy, RetryPolicy};
//!
//! let policy = RetryPolicy {
//!     max_retries: 5,
//!     delay: Duration::from_millis(100),
//!     factor: 2.0,
//!     max_delay: Duration::from_millis(500),
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(policy.delay_for(0), Duration::from_millis(100));
//! assert_eq!(policy.delay_for(1), Duration::from_millis(200));
//! assert_eq!(policy.delay_for(3), Duration::from_millis(500));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Retry bounds and delay schedule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Extra attempts allowed after the first failure.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub delay: Duration,
    /// Multiplicative growth factor per retry (`1.0` = fixed delay).
    pub factor: f64,
    /// Upper bound for the grown delay.
    pub max_delay: Duration,
    /// Jitter applied to the bounded delay.
    pub jitter: JitterPolicy,
}

impl Default for RetryPolicy {
    /// Returns a policy with:
    /// - `max_retries = 3`;
    /// - `delay = 1s`, `factor = 1.0` (fixed);
    /// - `max_delay = 30s`;
    /// - no jitter.
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(1),
            factor: 1.0,
            max_delay: Duration::from_secs(30),
            jitter: JitterPolicy::None,
        }
    }
}

impl RetryPolicy {
    /// Fixed-delay policy with `max_retries` extra attempts.
    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            delay,
            ..Self::default()
        }
    }

    /// Returns the delay to sleep before retry number `retry` (0-indexed).
    ///
    /// The base is `delay × factor^retry`, clamped to `max_delay`; jitter is applied
    /// to the clamped base and never fed back into later retries.
    pub fn delay_for(&self, retry: u32) -> Duration {
        if retry == 0 || self.factor == 1.0 {
            return self.jitter.apply(self.delay.min(self.max_delay));
        }
        let cap = self.max_delay.as_secs_f64();
        let exp = retry.min(i32::MAX as u32) as i32;
        let grown = self.delay.as_secs_f64() * self.factor.powi(exp);

        let base = if !grown.is_finite() || grown < 0.0 || grown > cap {
            self.max_delay
        } else {
            Duration::try_from_secs_f64(grown)
                .unwrap_or(self.max_delay)
                .min(self.max_delay)
        };
        self.jitter.apply(base)
    }
}

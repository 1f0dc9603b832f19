//! # Jitter policy for retry delays.
//!
//! [`JitterPolicy`] randomizes retry delays so that many decorated tasks failing on
//! the same occurrence burst do not hammer a dependency in lockstep.
//!
//! - [`JitterPolicy::None`] - exact delay (default)
//! - [`JitterPolicy::Full`] - random delay in `[0, delay]`
//! - [`JitterPolicy::Equal`] - `delay/2 + random[0, delay/2]`

use rand::Rng;
use std::time::Duration;

/// Policy controlling randomization of retry delays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// No jitter: use the exact delay.
    #[default]
    None,
    /// Full jitter: random delay in `[0, delay]`.
    Full,
    /// Equal jitter: keeps at least half of the delay.
    Equal,
}

impl JitterPolicy {
    /// Applies jitter to `delay`.
    pub fn apply(&self, delay: Duration) -> Duration {
        let ms = delay.as_millis().min(u128::from(u64::MAX)) as u64;
        if ms == 0 {
            return delay;
        }
        match self {
            JitterPolicy::None => delay,
            JitterPolicy::Full => Duration::from_millis(rand::rng().random_range(0..=ms)),
            JitterPolicy::Equal => {
                let half = ms / 2;
                let spread = if half == 0 {
                    0
                } else {
                    rand::rng().random_range(0..=half)
                };
                Duration::from_millis(half + spread)
            }
        }
    }
}

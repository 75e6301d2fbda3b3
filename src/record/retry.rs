//! Attempt budget and inter-attempt delay for the recording loop.
//!
//! Every attempt counts against the budget, whether it produced a segment or
//! not: a live stream that "completes" has still dropped and needs recovering.
//!
//! # Example
//!
//! ```
//! use std::num::NonZeroU32;
//! use std::time::Duration;
//! use streamrecorder_core::record::{AttemptLimit, RetryDecision, RetryPolicy};
//!
//! let limit = AttemptLimit::Limited(NonZeroU32::new(3).unwrap());
//! let policy = RetryPolicy::new(limit, Duration::from_secs(5));
//!
//! match policy.should_retry(1) {
//!     RetryDecision::Retry { delay, attempt } => {
//!         println!("attempt {attempt} in {delay:?}");
//!     }
//!     RetryDecision::DoNotRetry { reason } => {
//!         println!("stopping: {reason}");
//!     }
//! }
//! ```

use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;

use tracing::{debug, instrument};

/// Value accepted on the command line to disable the attempt limit.
pub const UNLIMITED_ATTEMPTS_SENTINEL: i64 = -1;

/// Maximum number of attempts before the recorder gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptLimit {
    /// Stop once this many attempts have been made.
    Limited(NonZeroU32),
    /// Never stop on our own; only cancellation ends the run.
    Unlimited,
}

impl AttemptLimit {
    /// Converts a user-facing attempt count.
    ///
    /// `-1` disables the limit, positive values set it, anything else is `None`.
    #[must_use]
    pub fn from_count(count: i64) -> Option<Self> {
        if count == UNLIMITED_ATTEMPTS_SENTINEL {
            return Some(Self::Unlimited);
        }
        u32::try_from(count)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self::Limited)
    }

    /// Returns true if `attempts_made` uses up the budget.
    #[must_use]
    pub fn is_exhausted(self, attempts_made: u64) -> bool {
        match self {
            Self::Limited(max) => attempts_made >= u64::from(max.get()),
            Self::Unlimited => false,
        }
    }
}

impl fmt::Display for AttemptLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limited(max) => write!(f, "{max}"),
            Self::Unlimited => f.write_str("unlimited"),
        }
    }
}

/// Decision on whether to make another attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait `delay`, then make attempt number `attempt` (1-indexed).
    Retry {
        /// How long to wait before the next attempt.
        delay: Duration,
        /// Which attempt number comes next.
        attempt: u64,
    },

    /// Stop recording.
    DoNotRetry {
        /// Human-readable reason.
        reason: String,
    },
}

/// Attempt budget plus a fixed delay between attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: AttemptLimit,
    delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy from an attempt limit and a fixed inter-attempt delay.
    #[must_use]
    pub fn new(max_attempts: AttemptLimit, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Returns the configured attempt limit.
    #[must_use]
    pub fn max_attempts(&self) -> AttemptLimit {
        self.max_attempts
    }

    /// Returns the delay applied between attempts.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Decides what happens after `attempts_made` attempts (1-indexed count).
    #[instrument(level = "debug", skip(self), fields(max_attempts = %self.max_attempts))]
    pub fn should_retry(&self, attempts_made: u64) -> RetryDecision {
        if self.max_attempts.is_exhausted(attempts_made) {
            debug!(attempts_made, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        debug!(
            attempts_made,
            next_attempt = attempts_made + 1,
            delay_ms = self.delay.as_millis(),
            "will retry"
        );

        RetryDecision::Retry {
            delay: self.delay,
            attempt: attempts_made + 1,
        }
    }
}

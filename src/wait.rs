//! Bounded polling for state that a host updates asynchronously.
//!
//! Plugin activation and notification changes are not guaranteed to be
//! observable right after the input that causes them. Callers poll a
//! condition with [`wait_for_condition`] and get a [`WaitError::Timeout`]
//! naming the condition if it never holds.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

/// Default overall wait budget.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3_000);

/// Default delay before the first re-check.
pub const DEFAULT_INITIAL_INTERVAL: Duration = Duration::from_millis(100);

/// Default ceiling for the backoff delay.
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_millis(500);

/// Floor for the poll delay so a zero interval cannot spin.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Errors from waiting on a condition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WaitError {
    /// The condition did not hold before the deadline.
    #[error("{description} (waited {waited:?} over {attempts} checks)")]
    Timeout {
        /// What was being waited for.
        description: String,
        /// Time spent waiting.
        waited: Duration,
        /// Number of times the condition was evaluated.
        attempts: u32,
    },
}

/// Timing for a single poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Overall deadline measured from the first check.
    pub timeout: Duration,
    /// Delay after the first failed check.
    pub initial_interval: Duration,
    /// Upper bound for the doubling delay.
    pub max_interval: Duration,
}

impl WaitOptions {
    /// Options with the given deadline and default intervals.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            initial_interval: DEFAULT_INITIAL_INTERVAL,
            max_interval: DEFAULT_MAX_INTERVAL,
        }
    }
}

/// Poll `condition` until it returns true or `options.timeout` elapses.
///
/// The condition is checked immediately, then after delays that double
/// from `initial_interval` up to `max_interval`. The last check happens at
/// the deadline.
///
/// # Errors
///
/// Returns [`WaitError::Timeout`] carrying `description` if the condition
/// never held.
pub async fn wait_for_condition<F>(
    mut condition: F,
    options: &WaitOptions,
    description: &str,
) -> Result<(), WaitError>
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    let ceiling = options.max_interval.max(MIN_INTERVAL);
    let mut interval = options.initial_interval.clamp(MIN_INTERVAL, ceiling);
    let mut attempts: u32 = 0;

    loop {
        attempts = attempts.saturating_add(1);
        if condition() {
            debug!(condition = description, attempts, "condition met");
            return Ok(());
        }

        let waited = start.elapsed();
        if waited >= options.timeout {
            warn!(condition = description, ?waited, attempts, "wait timed out");
            return Err(WaitError::Timeout {
                description: description.to_owned(),
                waited,
                attempts,
            });
        }

        let remaining = options.timeout.saturating_sub(waited);
        tokio::time::sleep(interval.min(remaining)).await;
        interval = interval.saturating_mul(2).min(ceiling);
    }
}

use std::time::Duration;

use crate::error::ClientError;

/// Exponential backoff for transient API failures
///
/// The delay before retry `n` (0-based) is `base * factor^n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the first retry
    pub base: Duration,
    /// Growth factor between retries
    pub factor: u32,
    /// Retries after the first attempt
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            factor: 2,
            max_retries: 3,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry `attempt`
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base.saturating_mul(self.factor.saturating_pow(attempt))
    }

    /// Whether to retry after `attempt` retries have already been made
    #[must_use]
    pub fn should_retry(&self, error: &ClientError, attempt: u32) -> bool {
        attempt < self.max_retries && error.is_transient()
    }
}

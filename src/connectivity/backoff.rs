//! Delay schedule between connection attempts.
//!
//! The default policy has a zero initial delay, so retries happen back to back.

use crate::config::ConnectivityConfig;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    pub initial_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
}

impl BackoffPolicy {
    /// Retry immediately, no delay between attempts
    pub fn immediate() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            multiplier: 1.0,
            max_delay: Duration::ZERO,
        }
    }

    pub fn from_config(config: &ConnectivityConfig) -> Self {
        Self {
            initial_delay: Duration::from_millis(config.initial_backoff_ms),
            multiplier: config.backoff_multiplier,
            max_delay: Duration::from_millis(config.max_backoff_ms),
        }
    }

    /// Delay before retry number `retry` (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        if self.initial_delay.is_zero() || retry == 0 {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(retry - 1).unwrap_or(i32::MAX);
        let scaled_ms =
            (self.initial_delay.as_millis() as f64) * self.multiplier.max(1.0).powi(exponent);
        let delay = if scaled_ms.is_finite() && scaled_ms < u64::MAX as f64 {
            Duration::from_millis(scaled_ms.round() as u64)
        } else {
            Duration::MAX
        };

        if self.max_delay.is_zero() {
            delay
        } else {
            delay.min(self.max_delay)
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::immediate()
    }
}

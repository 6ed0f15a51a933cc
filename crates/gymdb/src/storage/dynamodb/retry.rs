//! Backoff for resubmitting unprocessed batch writes.
//!
//! Delays grow exponentially with jitter so concurrent writers do not
//! resubmit in lockstep.

use std::time::Duration;

use rand::Rng;

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not counting the initial attempt)
    pub max_retries: u32,

    /// Initial delay before the first retry
    pub initial_delay: Duration,

    /// Maximum delay between retries (caps exponential growth)
    pub max_delay: Duration,

    /// Multiplier for exponential backoff
    pub multiplier: f64,

    /// Whether to add jitter to delays
    pub use_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(2),
            multiplier: 2.0,
            use_jitter: true,
        }
    }
}

impl RetryConfig {
    /// Set maximum retry attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Enable or disable jitter
    pub fn with_jitter(mut self, use_jitter: bool) -> Self {
        self.use_jitter = use_jitter;
        self
    }

    /// Calculate delay for a given attempt number (0-indexed)
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let delay_ms =
            self.initial_delay.as_millis() as f64 * self.multiplier.powi(attempt as i32);
        let delay_ms = delay_ms.min(self.max_delay.as_millis() as f64);

        // Jitter adds a random value between 0 and the delay
        let delay_ms = if self.use_jitter && delay_ms > 0.0 {
            delay_ms + rand::rng().random_range(0.0..delay_ms)
        } else {
            delay_ms
        };

        Duration::from_millis(delay_ms as u64)
    }
}

//! Bounded exponential backoff

use crate::config::ReconnectConfig;
use crate::constants::reconnect;
use std::time::Duration;

/// Delay law for reconnect attempts: `min(base * 2^attempt, max)` for
/// `attempt < max_attempts`, nothing after that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    base_delay: Duration,
    max_delay: Duration,
    max_attempts: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(reconnect::BASE_DELAY_MS),
            Duration::from_millis(reconnect::MAX_DELAY_MS),
            reconnect::MAX_ATTEMPTS,
        )
    }
}

impl BackoffPolicy {
    pub fn new(base_delay: Duration, max_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_delay,
            max_attempts,
        }
    }

    pub fn from_config(config: &ReconnectConfig) -> Self {
        Self::new(
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.max_delay_ms),
            config.max_attempts,
        )
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the zero-based `attempt`, or `None` once the budget is spent
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }

        let factor = 1u128.checked_shl(attempt).unwrap_or(u128::MAX);
        let delay_ms = self
            .base_delay
            .as_millis()
            .saturating_mul(factor)
            .min(self.max_delay.as_millis());

        Some(Duration::from_millis(
            u64::try_from(delay_ms).unwrap_or(u64::MAX),
        ))
    }

    /// Every delay of one full reconnect cycle, in order
    pub fn schedule(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_attempts).filter_map(|attempt| self.delay_for(attempt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_schedule_doubles_then_caps() {
        let delays: Vec<u64> = BackoffPolicy::default()
            .schedule()
            .map(|d| d.as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 10000]);
    }

    #[test]
    fn stops_after_max_attempts() {
        let policy = BackoffPolicy::default();
        assert!(policy.delay_for(4).is_some());
        assert_eq!(policy.delay_for(5), None);
        assert_eq!(policy.delay_for(u32::MAX), None);
    }

    #[test]
    fn zero_attempts_means_no_retries() {
        let policy = BackoffPolicy::new(Duration::from_secs(1), Duration::from_secs(10), 0);
        assert_eq!(policy.schedule().count(), 0);
    }

    #[test]
    fn huge_attempt_numbers_saturate_at_the_cap() {
        let policy = BackoffPolicy::new(Duration::from_secs(1), Duration::from_secs(10), 500);
        assert_eq!(policy.delay_for(200), Some(Duration::from_secs(10)));
    }

    proptest! {
        #[test]
        fn delay_matches_the_backoff_law(
            base_ms in 1u64..10_000,
            extra_ms in 0u64..100_000,
            attempt in 0u32..40,
        ) {
            let max_ms = base_ms + extra_ms;
            let policy = BackoffPolicy::new(
                Duration::from_millis(base_ms),
                Duration::from_millis(max_ms),
                64,
            );
            let expected = (u128::from(base_ms) << attempt).min(u128::from(max_ms)) as u64;
            prop_assert_eq!(policy.delay_for(attempt), Some(Duration::from_millis(expected)));
        }

        #[test]
        fn schedule_is_monotonic_and_bounded(
            base_ms in 1u64..5_000,
            extra_ms in 0u64..60_000,
            attempts in 0u32..20,
        ) {
            let policy = BackoffPolicy::new(
                Duration::from_millis(base_ms),
                Duration::from_millis(base_ms + extra_ms),
                attempts,
            );
            let delays: Vec<Duration> = policy.schedule().collect();
            prop_assert_eq!(delays.len(), attempts as usize);
            prop_assert!(delays.windows(2).all(|w| w[0] <= w[1]));
            prop_assert!(delays.iter().all(|d| *d <= policy.max_delay()));
        }
    }
}

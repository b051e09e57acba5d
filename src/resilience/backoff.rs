//! Exponential backoff with jitter.

use rand::Rng;
use std::time::Duration;

/// Cool-down growth for a backend that keeps failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Cool-down applied the first time a backend is disabled.
    pub base: Duration,
    /// Upper bound for any single cool-down (before jitter).
    pub max: Duration,
}

impl BackoffPolicy {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max }
    }

    /// Cool-down for the `streak`-th consecutive disable (1-based).
    pub fn delay(&self, streak: u32) -> Duration {
        calculate_backoff(streak, self.base.as_millis() as u64, self.max.as_millis() as u64)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(2),
            max: Duration::from_secs(300),
        }
    }
}

/// Calculate exponential backoff delay with jitter.
///
/// `base_ms * 2^(attempt - 1)`, capped at `max_ms`, plus up to 10% jitter.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let capped_delay = base_ms.saturating_mul(exponential_base).min(max_ms);

    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_per_streak() {
        let policy = BackoffPolicy::default();

        let first = policy.delay(1);
        assert!(first >= Duration::from_secs(2) && first < Duration::from_millis(2200));

        let second = policy.delay(2);
        assert!(second >= Duration::from_secs(4) && second < Duration::from_millis(4400));

        let third = policy.delay(3);
        assert!(third >= Duration::from_secs(8));
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = BackoffPolicy::default();
        let late = policy.delay(40);
        assert!(late >= Duration::from_secs(300));
        assert!(late < Duration::from_secs(330));
    }

    #[test]
    fn test_zero_attempt_has_no_delay() {
        assert_eq!(calculate_backoff(0, 100, 1000), Duration::ZERO);
    }
}

//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap backend calls with their per-backend timeout
//! - Track the overall wall-clock budget of one translation
//!
//! # Design Decisions
//! - Uses Tokio's timer, so dropping the wrapped future aborts the connection
//! - Timeout errors are distinct from other backend failures

use std::future::Future;
use std::time::Duration;
use tokio::time::{self, Instant};

use crate::adapter::BackendFailure;

/// Run a backend call, failing with [`BackendFailure::Timeout`] if it does not
/// finish within `limit`.
pub async fn bounded<F, T>(limit: Duration, call: F) -> Result<T, BackendFailure>
where
    F: Future<Output = Result<T, BackendFailure>>,
{
    match time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(BackendFailure::Timeout(limit)),
    }
}

/// Wall-clock budget shared by every attempt of a single translation.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    budget: Duration,
}

impl Deadline {
    /// Start a budget that expires `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Instant at which the budget runs out.
    pub fn at(&self) -> Instant {
        self.started + self.budget
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.elapsed())
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out() {
        let result: Result<(), _> = bounded(Duration::from_millis(200), async {
            time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(BackendFailure::Timeout(d)) if d == Duration::from_millis(200)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_passes_through() {
        let result = bounded(Duration::from_secs(1), async { Ok::<_, BackendFailure>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expires() {
        let deadline = Deadline::after(Duration::from_secs(3));
        assert!(!deadline.is_expired());

        time::advance(Duration::from_secs(2)).await;
        assert_eq!(deadline.remaining(), Duration::from_secs(1));

        time::advance(Duration::from_secs(2)).await;
        assert!(deadline.is_expired());
        assert_eq!(deadline.remaining(), Duration::ZERO);
    }
}

//! Periodic probing.
//!
//! # Responsibilities
//! - Periodically probe every candidate backend
//! - Keep the latency ranking fresh between translations

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time;

use crate::health::probe::Prober;
use crate::registry::Registry;

pub struct ProbeMonitor {
    registry: Arc<Registry>,
    prober: Prober,
    interval: Duration,
}

impl ProbeMonitor {
    pub fn new(registry: Arc<Registry>, prober: Prober, interval: Duration) -> Self {
        Self {
            registry,
            prober,
            interval,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            timeout_ms = self.prober.timeout().as_millis() as u64,
            "Probe monitor starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Probe monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// One probe round over the current candidates.
    pub async fn check_all(&self) -> usize {
        self.registry.reactivate_expired();
        let candidates = self.registry.list_candidates();
        let seeded = self.prober.warm(&self.registry, &candidates).await;
        tracing::debug!(
            probed = candidates.len(),
            answered = seeded,
            "Probe round complete"
        );
        seeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::backend::tests::backend;
    use crate::resilience::BackoffPolicy;

    #[tokio::test(start_paused = true)]
    async fn test_monitor_stops_on_shutdown() {
        let registry = Arc::new(
            Registry::new(vec![backend("a", 0)], 3, BackoffPolicy::default()).unwrap(),
        );
        let monitor = ProbeMonitor::new(
            registry.clone(),
            Prober::new(Duration::from_millis(100), "Hello"),
            Duration::from_secs(60),
        );

        let (tx, rx) = broadcast::channel(1);
        let task = tokio::spawn(monitor.run(rx));

        time::sleep(Duration::from_secs(130)).await;
        tx.send(()).unwrap();
        task.await.unwrap();

        // Failed probes rank nothing and disable nothing
        let health = registry.get("a").unwrap().health();
        assert_eq!(health.consecutive_failures, 0);
        assert_eq!(health.last_latency, None);
    }
}

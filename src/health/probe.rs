//! Latency probing.
//!
//! # Responsibilities
//! - Send a tiny translation to a backend under a short timeout
//! - Seed the registry's latency ranking with the result

use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::adapter::BackendFailure;
use crate::config::ProbeConfig;
use crate::language::Lang;
use crate::observability::metrics;
use crate::registry::{Backend, Registry};
use crate::resilience::timeouts::bounded;

/// Issues probe requests.
#[derive(Debug, Clone)]
pub struct Prober {
    timeout: Duration,
    interval: Duration,
    sample_text: Arc<str>,
}

impl Prober {
    pub fn new(timeout: Duration, sample_text: impl Into<String>) -> Self {
        Self {
            timeout,
            interval: Duration::from_secs(ProbeConfig::default().interval_secs),
            sample_text: Arc::from(sample_text.into()),
        }
    }

    /// Minimum spacing between probes of one backend.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// `None` when probing is disabled.
    pub fn from_config(config: &ProbeConfig) -> Option<Self> {
        config.enabled.then(|| {
            Self::new(
                Duration::from_millis(config.timeout_ms),
                config.sample_text.clone(),
            )
            .with_interval(Duration::from_secs(config.interval_secs))
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn sample_text(&self) -> &str {
        &self.sample_text
    }

    /// Probe one backend, returning the observed latency.
    pub async fn probe(&self, backend: &Backend) -> Result<Duration, BackendFailure> {
        let limit = self.timeout.min(backend.timeout());
        let started = Instant::now();
        backend.mark_probed(started);
        let outcome = bounded(
            limit,
            backend.adapter().send(&self.sample_text, Lang::En, Lang::Zh, limit),
        )
        .await;
        metrics::record_probe(backend.id(), outcome.is_ok());
        outcome.map(|_| started.elapsed())
    }

    /// Probe `backends` concurrently and seed the registry. Returns how many answered.
    pub async fn warm(&self, registry: &Registry, backends: &[Arc<Backend>]) -> usize {
        let probes = backends.iter().map(|backend| async move {
            let outcome = self.probe(backend).await;
            (backend, outcome)
        });

        let mut seeded = 0;
        for (backend, outcome) in join_all(probes).await {
            match outcome {
                Ok(latency) => {
                    tracing::debug!(
                        backend = %backend.id(),
                        latency_ms = latency.as_millis() as u64,
                        "Probe succeeded"
                    );
                    registry.record_probe(backend.id(), latency);
                    seeded += 1;
                }
                Err(failure) => {
                    tracing::debug!(backend = %backend.id(), error = %failure, "Probe failed");
                }
            }
        }
        seeded
    }
}

impl Default for Prober {
    fn default() -> Self {
        let config = ProbeConfig::default();
        Self::new(Duration::from_millis(config.timeout_ms), config.sample_text)
    }
}

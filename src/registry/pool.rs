//! Backend registry.
//!
//! # Responsibilities
//! - Hold every configured backend, in configuration order, ids unique
//! - Rank the currently eligible candidates
//! - Apply attempt outcomes and probe results to per-backend health

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use url::Url;

use crate::adapter;
use crate::config::TranslatorConfig;
use crate::observability::metrics;
use crate::registry::backend::{Backend, BackendSnapshot};
use crate::resilience::BackoffPolicy;

/// Error building the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate backend id '{0}'")]
    DuplicateId(String),

    #[error("backend '{id}' has an invalid endpoint: {reason}")]
    InvalidEndpoint { id: String, reason: String },
}

/// Owns every backend and its health.
#[derive(Debug)]
pub struct Registry {
    backends: Vec<Arc<Backend>>,
    failure_threshold: u32,
    backoff: BackoffPolicy,
}

impl Registry {
    /// Create a registry. Position in `backends` is the final ranking tie-breaker.
    pub fn new(
        backends: Vec<Backend>,
        failure_threshold: u32,
        backoff: BackoffPolicy,
    ) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(backends.len());

        for (order, mut backend) in backends.into_iter().enumerate() {
            if !seen.insert(backend.id().to_string()) {
                return Err(RegistryError::DuplicateId(backend.id().to_string()));
            }
            backend.order = order;
            metrics::record_backend_enabled(backend.id(), true);
            entries.push(Arc::new(backend));
        }

        Ok(Self {
            backends: entries,
            failure_threshold: failure_threshold.max(1),
            backoff,
        })
    }

    /// Build backends and their adapters from configuration.
    pub fn from_config(
        config: &TranslatorConfig,
        client: reqwest::Client,
    ) -> Result<Self, RegistryError> {
        let mut backends = Vec::with_capacity(config.backends.len());

        for backend_config in &config.backends {
            let endpoint = Url::parse(&backend_config.endpoint).map_err(|e| {
                RegistryError::InvalidEndpoint {
                    id: backend_config.id.clone(),
                    reason: e.to_string(),
                }
            })?;

            let adapter = adapter::build(backend_config, endpoint.clone(), client.clone());
            backends.push(Backend::new(
                backend_config.id.clone(),
                endpoint,
                backend_config.priority,
                Duration::from_millis(backend_config.timeout_ms),
                adapter,
            ));
        }

        Self::new(
            backends,
            config.health.failure_threshold,
            config.health.backoff(),
        )
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<Arc<Backend>> {
        self.backends.iter().find(|b| b.id() == id).cloned()
    }

    /// Every backend in configuration order, eligible or not.
    pub fn all_backends(&self) -> &[Arc<Backend>] {
        &self.backends
    }

    /// Give backends whose cool-down has elapsed another chance.
    pub fn reactivate_expired(&self) -> usize {
        let now = Instant::now();
        let mut reactivated = 0;
        for backend in &self.backends {
            if backend.reactivate_if_expired(now) {
                tracing::info!(backend = %backend.id(), "Cool-down elapsed, backend reactivated");
                metrics::record_backend_enabled(backend.id(), true);
                reactivated += 1;
            }
        }
        reactivated
    }

    /// Backends not cooling down, best first.
    ///
    /// Order: priority ascending, then last known latency ascending (unknown
    /// after known), then configuration order.
    pub fn list_candidates(&self) -> Vec<Arc<Backend>> {
        let now = Instant::now();
        let mut ranked: Vec<(Option<Duration>, Arc<Backend>)> = self
            .backends
            .iter()
            .filter_map(|backend| {
                let health = backend.health();
                if health.is_disabled_at(now) {
                    None
                } else {
                    Some((health.last_latency, backend.clone()))
                }
            })
            .collect();

        ranked.sort_by(|(lat_a, a), (lat_b, b)| {
            a.priority()
                .cmp(&b.priority())
                .then_with(|| compare_latency(*lat_a, *lat_b))
                .then_with(|| a.order.cmp(&b.order))
        });

        ranked.into_iter().map(|(_, backend)| backend).collect()
    }

    /// Apply the outcome of a real translation attempt.
    pub fn record_outcome(&self, backend_id: &str, success: bool, latency: Duration) {
        let Some(backend) = self.get(backend_id) else {
            tracing::warn!(backend = %backend_id, "Outcome recorded for unknown backend");
            return;
        };

        if success {
            if backend.mark_success(latency) {
                tracing::info!(backend = %backend_id, "Backend recovered");
                metrics::record_backend_enabled(backend_id, true);
            }
            metrics::record_backend_latency(backend_id, latency);
            return;
        }

        let failures_before = backend.health().consecutive_failures;
        if let Some(cooldown) =
            backend.mark_failure(self.failure_threshold, &self.backoff, Instant::now())
        {
            tracing::warn!(
                backend = %backend_id,
                consecutive_failures = failures_before + 1,
                cooldown_ms = cooldown.as_millis() as u64,
                "Backend entering cool-down"
            );
            metrics::record_backend_enabled(backend_id, false);
        }
    }

    /// Seed ranking latency from a successful probe.
    pub fn record_probe(&self, backend_id: &str, latency: Duration) {
        if let Some(backend) = self.get(backend_id) {
            backend.seed_latency(latency);
            metrics::record_backend_latency(backend_id, latency);
        }
    }

    /// Listing of every backend in configuration order.
    pub fn snapshots(&self) -> Vec<BackendSnapshot> {
        let now = Instant::now();
        self.backends.iter().map(|b| b.snapshot(now)).collect()
    }
}

fn compare_latency(a: Option<Duration>, b: Option<Duration>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::backend::tests::backend;

    fn ids(backends: &[Arc<Backend>]) -> Vec<&str> {
        backends.iter().map(|b| b.id()).collect()
    }

    fn registry(backends: Vec<Backend>, threshold: u32) -> Registry {
        Registry::new(
            backends,
            threshold,
            BackoffPolicy::new(Duration::from_secs(2), Duration::from_secs(300)),
        )
        .unwrap()
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = Registry::new(
            vec![backend("a", 0), backend("a", 1)],
            3,
            BackoffPolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateId(id) if id == "a"));
    }

    #[tokio::test]
    async fn test_ranking_priority_latency_then_order() {
        let reg = registry(
            vec![backend("c", 1), backend("b", 1), backend("a", 0), backend("d", 1)],
            3,
        );
        // Unknown latency: priority, then config order
        assert_eq!(ids(&reg.list_candidates()), vec!["a", "c", "b", "d"]);

        reg.record_outcome("d", true, Duration::from_millis(50));
        reg.record_outcome("b", true, Duration::from_millis(200));
        assert_eq!(ids(&reg.list_candidates()), vec!["a", "d", "b", "c"]);

        reg.record_probe("c", Duration::from_millis(10));
        assert_eq!(ids(&reg.list_candidates()), vec!["a", "c", "d", "b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_backend_excluded_then_reappears() {
        let reg = registry(vec![backend("a", 0), backend("b", 1)], 3);

        for _ in 0..2 {
            reg.record_outcome("a", false, Duration::ZERO);
        }
        assert_eq!(ids(&reg.list_candidates()), vec!["a", "b"]);

        reg.record_outcome("a", false, Duration::ZERO);
        assert_eq!(ids(&reg.list_candidates()), vec!["b"]);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(reg.reactivate_expired(), 0);
        assert_eq!(ids(&reg.list_candidates()), vec!["b"]);

        // Base cool-down is 2s plus at most 10% jitter
        tokio::time::advance(Duration::from_millis(1300)).await;
        assert_eq!(reg.reactivate_expired(), 1);
        assert_eq!(ids(&reg.list_candidates()), vec!["a", "b"]);
        assert_eq!(reg.get("a").unwrap().health().disabled_until, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_resets_failure_count() {
        let reg = registry(vec![backend("a", 0)], 2);
        reg.record_outcome("a", false, Duration::ZERO);
        reg.record_outcome("a", true, Duration::from_millis(30));
        reg.record_outcome("a", false, Duration::ZERO);
        assert_eq!(ids(&reg.list_candidates()), vec!["a"]);
        assert_eq!(reg.get("a").unwrap().health().consecutive_failures, 1);
    }

    #[test]
    fn test_concurrent_outcomes_do_not_lose_updates() {
        let reg = Arc::new(registry(vec![backend("a", 0), backend("b", 0)], u32::MAX));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let reg = reg.clone();
                std::thread::spawn(move || {
                    let id = if i % 2 == 0 { "a" } else { "b" };
                    for _ in 0..1000 {
                        reg.record_outcome(id, false, Duration::ZERO);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(reg.get("a").unwrap().health().consecutive_failures, 4000);
        assert_eq!(reg.get("b").unwrap().health().consecutive_failures, 4000);
    }

    #[tokio::test]
    async fn test_snapshots_in_config_order() {
        let reg = registry(vec![backend("z", 5), backend("y", 0)], 3);
        let snaps = reg.snapshots();
        assert_eq!(snaps.len(), 2);
        assert_eq!(snaps[0].id, "z");
        assert_eq!(snaps[1].id, "y");
        assert!(snaps.iter().all(|s| s.enabled));
    }
}

//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single configured translation backend
//! - Own the adapter that speaks its protocol
//! - Track health: consecutive failures, last latency, cool-down

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

use crate::adapter::TranslationAdapter;
use crate::resilience::BackoffPolicy;

/// Mutable health bookkeeping of one backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthState {
    /// Failures since the last success.
    pub consecutive_failures: u32,
    /// Cool-downs entered since the last success.
    pub cooldown_streak: u32,
    /// Latency of the last successful request or probe.
    pub last_latency: Option<Duration>,
    /// Excluded from selection until this instant.
    pub disabled_until: Option<Instant>,
    /// When a probe was last sent, whatever its outcome.
    pub last_probed: Option<Instant>,
}

impl HealthState {
    pub fn is_disabled_at(&self, now: Instant) -> bool {
        matches!(self.disabled_until, Some(until) if until > now)
    }
}

/// A single translation backend.
#[derive(Debug)]
pub struct Backend {
    id: String,
    endpoint: Url,
    priority: u32,
    timeout: Duration,
    /// Position in the configuration, last ranking tie-breaker.
    pub(crate) order: usize,
    adapter: Arc<dyn TranslationAdapter>,
    health: Mutex<HealthState>,
}

impl Backend {
    /// Create a new backend. Lower `priority` is preferred.
    pub fn new(
        id: impl Into<String>,
        endpoint: Url,
        priority: u32,
        timeout: Duration,
        adapter: Arc<dyn TranslationAdapter>,
    ) -> Self {
        Self {
            id: id.into(),
            endpoint,
            priority,
            timeout,
            order: 0,
            adapter,
            health: Mutex::new(HealthState::default()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn adapter(&self) -> &Arc<dyn TranslationAdapter> {
        &self.adapter
    }

    fn lock(&self) -> MutexGuard<'_, HealthState> {
        // Every update leaves the state consistent, so a poisoned lock is still usable.
        self.health.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current health state.
    pub fn health(&self) -> HealthState {
        self.lock().clone()
    }

    pub fn is_available_at(&self, now: Instant) -> bool {
        !self.lock().is_disabled_at(now)
    }

    // --- Health Logic ---

    /// Report a successful request. Returns true if the backend was failing before.
    pub fn mark_success(&self, latency: Duration) -> bool {
        let mut health = self.lock();
        let was_failing = health.consecutive_failures > 0 || health.disabled_until.is_some();
        health.consecutive_failures = 0;
        health.cooldown_streak = 0;
        health.disabled_until = None;
        health.last_latency = Some(latency);
        was_failing
    }

    /// Report a failed request.
    ///
    /// Once `threshold` consecutive failures are reached the backend enters a
    /// cool-down whose length grows with each streak. The failure counter is
    /// kept across the cool-down, so the first failure after reactivation
    /// starts the next, longer cool-down. Returns the cool-down if one began.
    pub fn mark_failure(
        &self,
        threshold: u32,
        backoff: &BackoffPolicy,
        now: Instant,
    ) -> Option<Duration> {
        let mut health = self.lock();
        health.consecutive_failures = health.consecutive_failures.saturating_add(1);

        if health.consecutive_failures < threshold || health.is_disabled_at(now) {
            return None;
        }

        health.cooldown_streak = health.cooldown_streak.saturating_add(1);
        let cooldown = backoff.delay(health.cooldown_streak);
        health.disabled_until = Some(now + cooldown);
        Some(cooldown)
    }

    /// Seed the ranking latency from a probe without touching failure counters.
    pub fn seed_latency(&self, latency: Duration) {
        self.lock().last_latency = Some(latency);
    }

    /// Note that a probe is being sent now.
    pub fn mark_probed(&self, now: Instant) {
        self.lock().last_probed = Some(now);
    }

    /// Reserve a probe slot unless one was taken within `interval`.
    ///
    /// Check and stamp happen under one lock, so concurrent translations
    /// never probe the same backend twice.
    pub fn try_claim_probe(&self, now: Instant, interval: Duration) -> bool {
        let mut health = self.lock();
        if matches!(health.last_probed, Some(at) if now.saturating_duration_since(at) < interval) {
            return false;
        }
        health.last_probed = Some(now);
        true
    }

    /// Clear an elapsed cool-down. Returns true if the backend was reactivated.
    pub fn reactivate_if_expired(&self, now: Instant) -> bool {
        let mut health = self.lock();
        match health.disabled_until {
            Some(until) if until <= now => {
                health.disabled_until = None;
                true
            }
            _ => false,
        }
    }

    /// Serializable view for listings.
    pub fn snapshot(&self, now: Instant) -> BackendSnapshot {
        let health = self.health();
        let cooldown_remaining = health
            .disabled_until
            .filter(|until| *until > now)
            .map(|until| until - now);

        BackendSnapshot {
            id: self.id.clone(),
            endpoint: self.endpoint.to_string(),
            protocol: self.adapter.protocol().to_string(),
            priority: self.priority,
            timeout_ms: self.timeout.as_millis() as u64,
            consecutive_failures: health.consecutive_failures,
            last_latency_ms: health.last_latency.map(|d| d.as_millis() as u64),
            cooldown_remaining_ms: cooldown_remaining.map(|d| d.as_millis() as u64),
            enabled: cooldown_remaining.is_none(),
        }
    }
}

/// Point-in-time description of a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSnapshot {
    pub id: String,
    pub endpoint: String,
    pub protocol: String,
    pub priority: u32,
    pub timeout_ms: u64,
    pub consecutive_failures: u32,
    pub last_latency_ms: Option<u64>,
    pub cooldown_remaining_ms: Option<u64>,
    pub enabled: bool,
}

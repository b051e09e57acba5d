//! Translation orchestrator.
//!
//! # Responsibilities
//! - Validate input and fix the translation direction
//! - Pick ranked candidates from the registry
//! - Drive attempts with fallback under per-backend and overall deadlines
//! - Record every attempt outcome in the registry

use futures_util::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::adapter::BackendFailure;
use crate::config::{DispatchConfig, TranslatorConfig};
use crate::dispatch::error::{Attempt, TranslationError};
use crate::dispatch::request::{TranslateOptions, TranslationRequest, TranslationResult};
use crate::health::Prober;
use crate::language::LanguageDetector;
use crate::observability::metrics;
use crate::registry::{Backend, Registry};
use crate::resilience::Deadline;

/// Attempt limits for one translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPolicy {
    /// Upper bound on candidates tried.
    pub max_attempts: usize,
    /// Wall-clock budget across all attempts.
    pub overall_budget: Duration,
    /// Top-ranked candidates raced in parallel; 1 means strictly sequential.
    pub race_width: usize,
}

impl DispatchPolicy {
    pub fn from_config(config: &DispatchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            overall_budget: Duration::from_millis(config.overall_timeout_ms),
            race_width: config.race_width.max(1),
        }
    }
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self::from_config(&DispatchConfig::default())
    }
}

enum WaveOutcome {
    Succeeded(TranslationResult),
    Exhausted,
    Expired,
    Cancelled,
}

/// Drives a translation from raw text to a terminal outcome.
#[derive(Debug)]
pub struct Orchestrator {
    registry: Arc<Registry>,
    detector: LanguageDetector,
    prober: Option<Prober>,
    policy: DispatchPolicy,
}

impl Orchestrator {
    pub fn new(registry: Arc<Registry>, detector: LanguageDetector, policy: DispatchPolicy) -> Self {
        Self {
            registry,
            detector,
            prober: None,
            policy,
        }
    }

    /// Probe ambiguous top candidates before dispatching.
    pub fn with_prober(mut self, prober: Prober) -> Self {
        self.prober = Some(prober);
        self
    }

    pub fn from_config(config: &TranslatorConfig, registry: Arc<Registry>) -> Self {
        let orchestrator = Self::new(
            registry,
            LanguageDetector::new(config.detection.cjk_threshold),
            DispatchPolicy::from_config(&config.dispatch),
        );
        match Prober::from_config(&config.probe) {
            Some(prober) => orchestrator.with_prober(prober),
            None => orchestrator,
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn prober(&self) -> Option<&Prober> {
        self.prober.as_ref()
    }

    pub fn policy(&self) -> &DispatchPolicy {
        &self.policy
    }

    /// Translate `text` between English and Chinese.
    pub async fn translate(&self, text: &str) -> Result<TranslationResult, TranslationError> {
        self.translate_with(text, TranslateOptions::default()).await
    }

    /// Translate with a preferred backend and/or a cancellation token.
    pub async fn translate_with(
        &self,
        text: &str,
        options: TranslateOptions,
    ) -> Result<TranslationResult, TranslationError> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("translate", %request_id);

        async {
            let started = Instant::now();
            let outcome = self.run(text, &options).await;
            let label = match &outcome {
                Ok(_) => "succeeded",
                Err(e) => e.kind(),
            };
            metrics::record_translation(label, started.elapsed());
            if let Err(e) = &outcome {
                tracing::warn!(kind = e.kind(), error = %e, "Translation failed");
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        text: &str,
        options: &TranslateOptions,
    ) -> Result<TranslationResult, TranslationError> {
        if text.trim().is_empty() {
            return Err(TranslationError::InvalidInput("selection is empty".into()));
        }

        let request = TranslationRequest::from_source(text, self.detector.detect(text))?;
        tracing::debug!(
            source = %request.source(),
            target = %request.target(),
            chars = text.chars().count(),
            "Direction detected"
        );

        let deadline = Deadline::after(self.policy.overall_budget);
        let candidates = self.select_candidates(options, &deadline).await?;
        self.dispatch(&request, candidates, &deadline, &options.cancel)
            .await
    }

    /// Ranked candidates for this request, truncated to the attempt limit.
    async fn select_candidates(
        &self,
        options: &TranslateOptions,
        deadline: &Deadline,
    ) -> Result<Vec<Arc<Backend>>, TranslationError> {
        self.registry.reactivate_expired();
        let mut candidates = self.registry.list_candidates();
        if candidates.is_empty() {
            return Err(TranslationError::NoBackendsAvailable);
        }

        if let Some(prober) = &self.prober {
            if self.warm_up(prober, &candidates, deadline, &options.cancel).await {
                candidates = self.registry.list_candidates();
                if candidates.is_empty() {
                    return Err(TranslationError::NoBackendsAvailable);
                }
            }
        }

        if let Some(preferred) = options.preferred_backend.as_deref() {
            match candidates.iter().position(|b| b.id() == preferred) {
                Some(pos) => {
                    let backend = candidates.remove(pos);
                    candidates.insert(0, backend);
                }
                None => {
                    tracing::warn!(backend = %preferred, "Preferred backend unavailable, using ranked order");
                }
            }
        }

        if let Some(prober) = &self.prober {
            // The first wave is about to be contacted for real
            let first_wave = self.policy.race_width.min(candidates.len());
            self.warm_in_background(prober, &candidates[first_wave..]);
        }

        candidates.truncate(self.policy.max_attempts);
        Ok(candidates)
    }

    /// Probe the ambiguous top priority tier before ranking it.
    ///
    /// Waits at most the probe timeout, and only for tier members with
    /// unknown latency that were not probed within the probe interval.
    /// Returns true if the ranking may have changed.
    async fn warm_up(
        &self,
        prober: &Prober,
        candidates: &[Arc<Backend>],
        deadline: &Deadline,
        cancel: &CancellationToken,
    ) -> bool {
        let top_priority = candidates[0].priority();
        let top_tier: Vec<&Arc<Backend>> = candidates
            .iter()
            .take_while(|b| b.priority() == top_priority)
            .collect();
        if top_tier.len() < 2 {
            return false;
        }

        let now = Instant::now();
        let unknown_top: Vec<Arc<Backend>> = top_tier
            .into_iter()
            .filter(|b| b.health().last_latency.is_none())
            .filter(|b| b.try_claim_probe(now, prober.interval()))
            .map(Arc::clone)
            .collect();
        if unknown_top.is_empty() {
            return false;
        }

        let limit = prober.timeout().min(deadline.remaining());
        tracing::debug!(probing = unknown_top.len(), limit_ms = limit.as_millis() as u64, "Warming ranking");
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = time::timeout(limit, prober.warm(&self.registry, &unknown_top)) => {}
        }
        true
    }

    /// Probe backends with unknown latency without holding up dispatch.
    fn warm_in_background(&self, prober: &Prober, backends: &[Arc<Backend>]) {
        let now = Instant::now();
        let due: Vec<Arc<Backend>> = backends
            .iter()
            .filter(|b| b.health().last_latency.is_none())
            .filter(|b| b.try_claim_probe(now, prober.interval()))
            .cloned()
            .collect();
        if due.is_empty() {
            return;
        }

        tracing::debug!(probing = due.len(), "Warming ranking in background");
        let registry = Arc::clone(&self.registry);
        let prober = prober.clone();
        tokio::spawn(
            async move {
                prober.warm(&registry, &due).await;
            }
            .in_current_span(),
        );
    }

    /// Try candidates in order until one succeeds or a limit is hit.
    async fn dispatch(
        &self,
        request: &TranslationRequest,
        candidates: Vec<Arc<Backend>>,
        deadline: &Deadline,
        cancel: &CancellationToken,
    ) -> Result<TranslationResult, TranslationError> {
        let mut attempts = Vec::new();
        let mut pending = candidates.into_iter();
        let mut width = self.policy.race_width;

        loop {
            let wave: Vec<Arc<Backend>> = pending.by_ref().take(width).collect();
            if wave.is_empty() {
                break;
            }
            width = 1;

            if cancel.is_cancelled() {
                return Err(TranslationError::Cancelled { attempts });
            }
            if deadline.is_expired() {
                return Err(self.overall_timeout(deadline, attempts));
            }

            match self.run_wave(request, wave, deadline, cancel, &mut attempts).await {
                WaveOutcome::Succeeded(result) => return Ok(result),
                WaveOutcome::Exhausted => continue,
                WaveOutcome::Expired => return Err(self.overall_timeout(deadline, attempts)),
                WaveOutcome::Cancelled => return Err(TranslationError::Cancelled { attempts }),
            }
        }

        Err(TranslationError::AllBackendsFailed { attempts })
    }

    /// Run a group of attempts concurrently; the first success wins and the
    /// rest are dropped, which aborts their requests.
    async fn run_wave(
        &self,
        request: &TranslationRequest,
        wave: Vec<Arc<Backend>>,
        deadline: &Deadline,
        cancel: &CancellationToken,
        attempts: &mut Vec<Attempt>,
    ) -> WaveOutcome {
        let mut inflight: FuturesUnordered<_> = wave
            .into_iter()
            .map(|backend| self.attempt(request, backend))
            .collect();

        let expiry = time::sleep_until(deadline.at());
        tokio::pin!(expiry);

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    tracing::debug!(in_flight = inflight.len(), "Superseded, aborting in-flight attempts");
                    return WaveOutcome::Cancelled;
                }
                _ = &mut expiry => {
                    tracing::debug!(in_flight = inflight.len(), "Overall budget exhausted");
                    return WaveOutcome::Expired;
                }
                next = inflight.next() => match next {
                    None => return WaveOutcome::Exhausted,
                    Some((backend, Ok(translated), latency)) => {
                        self.registry.record_outcome(backend.id(), true, latency);
                        metrics::record_attempt(backend.id(), "success");
                        tracing::info!(
                            backend = %backend.id(),
                            latency_ms = latency.as_millis() as u64,
                            failed_before = attempts.len(),
                            "Translation succeeded"
                        );
                        return WaveOutcome::Succeeded(TranslationResult::new(
                            translated,
                            backend.id(),
                            latency,
                            request.source(),
                            request.target(),
                        ));
                    }
                    Some((backend, Err(failure), elapsed)) => {
                        self.registry.record_outcome(backend.id(), false, elapsed);
                        metrics::record_attempt(backend.id(), failure.kind());
                        tracing::warn!(
                            backend = %backend.id(),
                            error = %failure,
                            elapsed_ms = elapsed.as_millis() as u64,
                            "Attempt failed, falling back"
                        );
                        attempts.push(Attempt {
                            backend_id: backend.id().to_string(),
                            failure,
                        });
                    }
                }
            }
        }
    }

    async fn attempt(
        &self,
        request: &TranslationRequest,
        backend: Arc<Backend>,
    ) -> (Arc<Backend>, Result<String, BackendFailure>, Duration) {
        tracing::debug!(
            backend = %backend.id(),
            timeout_ms = backend.timeout().as_millis() as u64,
            "Dispatching attempt"
        );
        let started = Instant::now();
        let outcome = backend
            .adapter()
            .send(
                request.text(),
                request.source(),
                request.target(),
                backend.timeout(),
            )
            .await;
        (backend, outcome, started.elapsed())
    }

    fn overall_timeout(&self, deadline: &Deadline, attempts: Vec<Attempt>) -> TranslationError {
        TranslationError::OverallTimeout {
            budget: deadline.budget(),
            attempts,
        }
    }
}

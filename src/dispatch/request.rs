//! Request and result values.

use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::dispatch::error::TranslationError;
use crate::language::Lang;

/// Text to translate and its direction. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    text: String,
    source: Lang,
    target: Lang,
}

impl TranslationRequest {
    /// Build a request, rejecting blank text and identical languages.
    pub fn new(text: impl Into<String>, source: Lang, target: Lang) -> Result<Self, TranslationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(TranslationError::InvalidInput("selection is empty".into()));
        }
        if source == target {
            return Err(TranslationError::InvalidInput(format!(
                "source and target are both '{}'",
                source
            )));
        }
        Ok(Self {
            text,
            source,
            target,
        })
    }

    /// Request translating `text` out of `source` into the other language.
    pub fn from_source(text: impl Into<String>, source: Lang) -> Result<Self, TranslationError> {
        Self::new(text, source, source.opposite())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> Lang {
        self.source
    }

    pub fn target(&self) -> Lang {
        self.target
    }
}

/// Successful translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    translated_text: String,
    backend_id: String,
    latency: Duration,
    source: Lang,
    target: Lang,
}

impl TranslationResult {
    pub(crate) fn new(
        translated_text: String,
        backend_id: &str,
        latency: Duration,
        source: Lang,
        target: Lang,
    ) -> Self {
        Self {
            translated_text,
            backend_id: backend_id.to_string(),
            latency,
            source,
            target,
        }
    }

    pub fn translated_text(&self) -> &str {
        &self.translated_text
    }

    pub fn backend_id(&self) -> &str {
        &self.backend_id
    }

    /// Latency of the attempt that succeeded.
    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn source(&self) -> Lang {
        self.source
    }

    pub fn target(&self) -> Lang {
        self.target
    }

    pub fn into_text(self) -> String {
        self.translated_text
    }
}

/// Per-call knobs for [`Orchestrator::translate_with`](crate::dispatch::Orchestrator::translate_with).
#[derive(Debug, Clone, Default)]
pub struct TranslateOptions {
    /// Backend to try first; ranked fallback follows if it fails.
    pub preferred_backend: Option<String>,
    /// Cancelled when a newer request supersedes this one.
    pub cancel: CancellationToken,
}

impl TranslateOptions {
    pub fn prefer(mut self, backend_id: impl Into<String>) -> Self {
        self.preferred_backend = Some(backend_id.into());
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

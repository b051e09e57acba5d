//! Terminal translation errors.

use std::time::Duration;
use thiserror::Error;

use crate::adapter::BackendFailure;

/// One failed attempt against a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub backend_id: String,
    pub failure: BackendFailure,
}

/// Why a translation produced no result.
#[derive(Debug, Clone, Error)]
pub enum TranslationError {
    /// Empty or whitespace-only selection; no backend contacted.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Every backend is cooling down.
    #[error("no translation backends available")]
    NoBackendsAvailable,

    /// The overall budget ran out before any backend succeeded.
    #[error(
        "overall time budget of {}ms exhausted after {} failed attempt(s)",
        .budget.as_millis(),
        .attempts.len()
    )]
    OverallTimeout {
        budget: Duration,
        attempts: Vec<Attempt>,
    },

    /// Every attempted candidate failed.
    #[error("all {} attempted backend(s) failed", .attempts.len())]
    AllBackendsFailed { attempts: Vec<Attempt> },

    /// Superseded by a newer request.
    #[error("translation cancelled")]
    Cancelled { attempts: Vec<Attempt> },
}

impl TranslationError {
    /// Failed attempts in the order they were made.
    pub fn attempts(&self) -> &[Attempt] {
        match self {
            TranslationError::OverallTimeout { attempts, .. }
            | TranslationError::AllBackendsFailed { attempts }
            | TranslationError::Cancelled { attempts } => attempts,
            TranslationError::InvalidInput(_) | TranslationError::NoBackendsAvailable => &[],
        }
    }

    /// Stable tag for logs, metrics and the control protocol.
    pub fn kind(&self) -> &'static str {
        match self {
            TranslationError::InvalidInput(_) => "invalid_input",
            TranslationError::NoBackendsAvailable => "no_backends_available",
            TranslationError::OverallTimeout { .. } => "overall_timeout",
            TranslationError::AllBackendsFailed { .. } => "all_backends_failed",
            TranslationError::Cancelled { .. } => "cancelled",
        }
    }

    /// Short notice suitable for the overlay.
    pub fn user_message(&self) -> &'static str {
        match self {
            TranslationError::InvalidInput(_) => "nothing to translate",
            TranslationError::NoBackendsAvailable => {
                "all translation services are cooling down, retry shortly"
            }
            TranslationError::OverallTimeout { .. } => "translation timed out, retry later",
            TranslationError::AllBackendsFailed { .. } => {
                "all translation services unavailable, retry later"
            }
            TranslationError::Cancelled { .. } => "translation superseded",
        }
    }
}

//! Supersession of in-flight translations.

use std::sync::{Mutex, PoisonError};
use tokio_util::sync::CancellationToken;

/// Hands out one cancellation token per translation and cancels the previous
/// one, so a newer user action supersedes an older, still running request.
#[derive(Debug, Default)]
pub struct RequestSlot {
    current: Mutex<Option<CancellationToken>>,
}

impl RequestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, cancelling whichever one was active.
    pub fn begin(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let previous = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(token.clone());

        if let Some(previous) = previous {
            if !previous.is_cancelled() {
                tracing::debug!("Superseding in-flight translation");
            }
            previous.cancel();
        }
        token
    }

    /// Cancel the active request, if any.
    pub fn cancel_current(&self) {
        if let Some(token) = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_cancels_previous() {
        let slot = RequestSlot::new();
        let first = slot.begin();
        assert!(!first.is_cancelled());

        let second = slot.begin();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());

        slot.cancel_current();
        assert!(second.is_cancelled());
    }
}

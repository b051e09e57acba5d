//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check backend ids are unique and endpoints usable
//! - Validate value ranges (timeouts > 0, thresholds sane)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: TranslatorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::TranslatorConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Check every semantic rule, collecting all violations.
pub fn validate_config(config: &TranslatorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let threshold = config.detection.cjk_threshold;
    if !(threshold > 0.0 && threshold < 1.0) {
        errors.push(ValidationError::new(
            "detection.cjk_threshold",
            "must be strictly between 0 and 1",
        ));
    }

    if config.dispatch.max_attempts == 0 {
        errors.push(ValidationError::new("dispatch.max_attempts", "must be at least 1"));
    }
    if config.dispatch.overall_timeout_ms == 0 {
        errors.push(ValidationError::new("dispatch.overall_timeout_ms", "must be greater than 0"));
    }
    if config.dispatch.race_width == 0 {
        errors.push(ValidationError::new("dispatch.race_width", "must be at least 1"));
    }

    if config.health.failure_threshold == 0 {
        errors.push(ValidationError::new("health.failure_threshold", "must be at least 1"));
    }
    if config.health.base_backoff_ms == 0 {
        errors.push(ValidationError::new("health.base_backoff_ms", "must be greater than 0"));
    }
    if config.health.base_backoff_ms > config.health.max_backoff_ms {
        errors.push(ValidationError::new(
            "health.max_backoff_ms",
            "must not be smaller than base_backoff_ms",
        ));
    }

    if config.probe.enabled {
        if config.probe.timeout_ms == 0 {
            errors.push(ValidationError::new("probe.timeout_ms", "must be greater than 0"));
        }
        if config.probe.interval_secs == 0 {
            errors.push(ValidationError::new("probe.interval_secs", "must be greater than 0"));
        }
        if config.probe.sample_text.trim().is_empty() {
            errors.push(ValidationError::new("probe.sample_text", "must not be empty"));
        }
    }

    if config.instance.lock_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "instance.lock_address",
            format!("'{}' is not a socket address", config.instance.lock_address),
        ));
    }
    if config.instance.max_clients == 0 {
        errors.push(ValidationError::new("instance.max_clients", "must be at least 1"));
    }

    if config.backends.is_empty() {
        errors.push(ValidationError::new("backends", "at least one backend is required"));
    }

    let mut seen = HashSet::new();
    for (i, backend) in config.backends.iter().enumerate() {
        let field = |name: &str| format!("backends[{}].{}", i, name);

        if backend.id.trim().is_empty() {
            errors.push(ValidationError::new(field("id"), "must not be empty"));
        } else if !seen.insert(backend.id.as_str()) {
            errors.push(ValidationError::new(
                field("id"),
                format!("duplicate backend id '{}'", backend.id),
            ));
        }

        match Url::parse(&backend.endpoint) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(ValidationError::new(
                field("endpoint"),
                format!("unsupported scheme '{}'", url.scheme()),
            )),
            Err(e) => errors.push(ValidationError::new(field("endpoint"), e.to_string())),
        }

        if backend.timeout_ms == 0 {
            errors.push(ValidationError::new(field("timeout_ms"), "must be greater than 0"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

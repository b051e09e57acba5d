//! Request adapters, one per backend wire protocol.
//!
//! # Data Flow
//! ```text
//! Orchestrator attempt (text, source, target, timeout)
//!     → TranslationAdapter::send
//!         - libre.rs  (LibreTranslate, JSON or form-encoded POST)
//!         - google.rs (translate_a/single "gtx" GET)
//!     → translated text | BackendFailure
//! ```
//!
//! # Design Decisions
//! - Adapters enforce their own timeout and never retry
//! - Backend-specific error payloads are mapped into `BackendFailure`
//! - One shared reqwest client (connection pool) for every adapter

pub mod google;
pub mod libre;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::{BackendConfig, HttpConfig};
use crate::language::Lang;

pub use google::GoogleAdapter;
pub use libre::{LibreAdapter, LibreEncoding};

/// Wire protocol spoken by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolKind {
    /// LibreTranslate `/translate` with a JSON body.
    Libre,
    /// LibreTranslate `/translate` with a form-encoded body.
    LibreForm,
    /// Google `translate_a/single?client=gtx`.
    Google,
}

impl ProtocolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProtocolKind::Libre => "libre",
            ProtocolKind::LibreForm => "libre_form",
            ProtocolKind::Google => "google",
        }
    }
}

impl fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a single attempt against a backend failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendFailure {
    /// The backend did not answer within its timeout.
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Connection refused, reset, DNS failure and the like.
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx answer, with the backend's own message when it sent one.
    #[error("HTTP {code}: {message}")]
    Status { code: u16, message: String },

    /// The body could not be understood.
    #[error("malformed response: {0}")]
    Protocol(String),
}

impl BackendFailure {
    /// Stable tag for logs, metrics and the control protocol.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendFailure::Timeout(_) => "backend_timeout",
            BackendFailure::Network(_) => "network",
            BackendFailure::Status { .. } => "status",
            BackendFailure::Protocol(_) => "backend_protocol_error",
        }
    }

    /// Map a reqwest error, treating its own timeout as ours.
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            BackendFailure::Timeout(timeout)
        } else if err.is_decode() {
            BackendFailure::Protocol(err.to_string())
        } else {
            BackendFailure::Network(err.to_string())
        }
    }
}

/// Generic `translate(text, from, to)` over one backend protocol.
#[async_trait]
pub trait TranslationAdapter: Send + Sync + fmt::Debug {
    /// Protocol name shown in backend listings.
    fn protocol(&self) -> &'static str;

    /// Translate `text`, returning within `timeout` whatever the network does.
    async fn send(
        &self,
        text: &str,
        source: Lang,
        target: Lang,
        timeout: Duration,
    ) -> Result<String, BackendFailure>;
}

/// Build the shared HTTP client used by every adapter.
pub fn http_client(config: &HttpConfig) -> reqwest::Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"));

    reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
}

/// Create the adapter for a configured backend.
pub fn build(
    config: &BackendConfig,
    endpoint: Url,
    client: reqwest::Client,
) -> Arc<dyn TranslationAdapter> {
    match config.protocol {
        ProtocolKind::Libre => Arc::new(LibreAdapter::new(
            client,
            endpoint,
            config.api_key.clone(),
            LibreEncoding::Json,
        )),
        ProtocolKind::LibreForm => Arc::new(LibreAdapter::new(
            client,
            endpoint,
            config.api_key.clone(),
            LibreEncoding::Form,
        )),
        ProtocolKind::Google => Arc::new(GoogleAdapter::new(client, endpoint)),
    }
}

/// First few hundred characters of a body, for error messages.
pub(crate) fn body_snippet(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.chars().count() > 200 {
        let cut: String = trimmed.chars().take(200).collect();
        format!("{}...", cut)
    } else {
        trimmed.to_string()
    }
}

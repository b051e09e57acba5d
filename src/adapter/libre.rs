//! LibreTranslate adapter.
//!
//! `POST {endpoint}` with `q`, `source`, `target`, `format` (and `api_key` when
//! configured), answered by `{"translatedText": "..."}` or `{"error": "..."}`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::adapter::{body_snippet, BackendFailure, TranslationAdapter};
use crate::language::Lang;
use crate::resilience::timeouts::bounded;

/// Body encoding a LibreTranslate instance accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibreEncoding {
    Json,
    Form,
}

#[derive(Debug, Serialize)]
struct LibreRequest<'a> {
    q: &'a str,
    source: &'static str,
    target: &'static str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct LibreResponse {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
    error: Option<String>,
}

#[derive(Debug)]
pub struct LibreAdapter {
    client: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
    encoding: LibreEncoding,
}

impl LibreAdapter {
    pub fn new(
        client: reqwest::Client,
        endpoint: Url,
        api_key: Option<String>,
        encoding: LibreEncoding,
    ) -> Self {
        Self {
            client,
            endpoint,
            api_key,
            encoding,
        }
    }

    async fn exchange(
        &self,
        text: &str,
        source: Lang,
        target: Lang,
        timeout: Duration,
    ) -> Result<String, BackendFailure> {
        let body = LibreRequest {
            q: text,
            source: source.code(),
            target: target.code(),
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let request = self.client.post(self.endpoint.clone()).timeout(timeout);
        let request = match self.encoding {
            LibreEncoding::Json => request.json(&body),
            LibreEncoding::Form => request.form(&body),
        };

        let response = request
            .send()
            .await
            .map_err(|e| BackendFailure::from_reqwest(e, timeout))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| BackendFailure::from_reqwest(e, timeout))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<LibreResponse>(&bytes)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or_else(|| body_snippet(&bytes));
            return Err(BackendFailure::Status {
                code: status.as_u16(),
                message,
            });
        }

        let parsed: LibreResponse = serde_json::from_slice(&bytes)
            .map_err(|e| BackendFailure::Protocol(format!("invalid JSON: {}", e)))?;

        match (parsed.translated_text, parsed.error) {
            (Some(text), _) if !text.trim().is_empty() => Ok(text),
            (Some(_), _) => Err(BackendFailure::Protocol("empty translatedText".into())),
            (None, Some(error)) => Err(BackendFailure::Protocol(error)),
            (None, None) => Err(BackendFailure::Protocol("missing translatedText".into())),
        }
    }
}

#[async_trait]
impl TranslationAdapter for LibreAdapter {
    fn protocol(&self) -> &'static str {
        match self.encoding {
            LibreEncoding::Json => "libre",
            LibreEncoding::Form => "libre_form",
        }
    }

    async fn send(
        &self,
        text: &str,
        source: Lang,
        target: Lang,
        timeout: Duration,
    ) -> Result<String, BackendFailure> {
        bounded(timeout, self.exchange(text, source, target, timeout)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_encoding() {
        let body = LibreRequest {
            q: "hello",
            source: "en",
            target: "zh",
            format: "text",
            api_key: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["q"], "hello");
        assert_eq!(json["format"], "text");
        assert!(json.get("api_key").is_none());
    }

    #[test]
    fn test_response_with_error_payload() {
        let parsed: LibreResponse =
            serde_json::from_str(r#"{"error": "Too many requests"}"#).unwrap();
        assert!(parsed.translated_text.is_none());
        assert_eq!(parsed.error.as_deref(), Some("Too many requests"));
    }
}

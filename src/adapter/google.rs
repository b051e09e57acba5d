//! Google `translate_a/single` adapter.
//!
//! The answer is a nested JSON array whose first element lists the translated
//! segments; the translation is the concatenation of each segment's first item.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::adapter::{body_snippet, BackendFailure, TranslationAdapter};
use crate::language::Lang;
use crate::resilience::timeouts::bounded;

#[derive(Debug)]
pub struct GoogleAdapter {
    client: reqwest::Client,
    endpoint: Url,
}

impl GoogleAdapter {
    pub fn new(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    async fn exchange(
        &self,
        text: &str,
        source: Lang,
        target: Lang,
        timeout: Duration,
    ) -> Result<String, BackendFailure> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("client", "gtx"),
                ("sl", source.code()),
                ("tl", target.code()),
                ("dt", "t"),
                ("q", text),
            ])
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| BackendFailure::from_reqwest(e, timeout))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| BackendFailure::from_reqwest(e, timeout))?;

        if !status.is_success() {
            return Err(BackendFailure::Status {
                code: status.as_u16(),
                message: body_snippet(&bytes),
            });
        }

        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| BackendFailure::Protocol(format!("invalid JSON: {}", e)))?;
        parse_segments(&value)
    }
}

/// Join the translated segments of a `translate_a/single` answer.
fn parse_segments(value: &Value) -> Result<String, BackendFailure> {
    let segments = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| BackendFailure::Protocol("missing segment list".into()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.trim().is_empty() {
        return Err(BackendFailure::Protocol("no translated segments".into()));
    }
    Ok(translated)
}

#[async_trait]
impl TranslationAdapter for GoogleAdapter {
    fn protocol(&self) -> &'static str {
        "google"
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

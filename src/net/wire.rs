//! Control protocol messages.

use serde::{Deserialize, Serialize};

use crate::dispatch::{TranslationError, TranslationResult};
use crate::language::Lang;
use crate::registry::BackendSnapshot;

/// Request sent by a control client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    Translate {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        backend: Option<String>,
    },
    Backends,
    Probe {
        backend: String,
    },
}

/// One failed attempt as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptReport {
    pub backend: String,
    pub reason: String,
}

/// Answer to a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reply {
    Translated {
        text: String,
        backend: String,
        source: Lang,
        target: Lang,
        latency_ms: u64,
    },
    Failed {
        kind: String,
        message: String,
        attempts: Vec<AttemptReport>,
    },
    Backends {
        backends: Vec<BackendSnapshot>,
    },
    Probed {
        backend: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        latency_ms: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Error {
        message: String,
    },
}

impl Reply {
    pub fn error(message: impl Into<String>) -> Self {
        Reply::Error {
            message: message.into(),
        }
    }
}

impl From<Result<TranslationResult, TranslationError>> for Reply {
    fn from(outcome: Result<TranslationResult, TranslationError>) -> Self {
        match outcome {
            Ok(result) => Reply::Translated {
                backend: result.backend_id().to_string(),
                source: result.source(),
                target: result.target(),
                latency_ms: result.latency().as_millis() as u64,
                text: result.into_text(),
            },
            Err(e) => Reply::Failed {
                kind: e.kind().to_string(),
                message: e.user_message().to_string(),
                attempts: e
                    .attempts()
                    .iter()
                    .map(|a| AttemptReport {
                        backend: a.backend_id.clone(),
                        reason: a.failure.to_string(),
                    })
                    .collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::BackendFailure;
    use crate::dispatch::Attempt;
    use serde_json::json;

    #[test]
    fn test_command_wire_format() {
        let cmd: Command =
            serde_json::from_str(r#"{"cmd":"translate","text":"hello"}"#).unwrap();
        assert_eq!(
            cmd,
            Command::Translate {
                text: "hello".into(),
                backend: None
            }
        );

        let cmd: Command = serde_json::from_str(r#"{"cmd":"probe","backend":"google"}"#).unwrap();
        assert_eq!(cmd, Command::Probe { backend: "google".into() });

        assert_eq!(
            serde_json::to_value(Command::Backends).unwrap(),
            json!({"cmd": "backends"})
        );
        assert!(serde_json::from_str::<Command>(r#"{"cmd":"reload"}"#).is_err());
    }

    #[test]
    fn test_failure_reply_carries_attempts() {
        let reply = Reply::from(Err::<TranslationResult, _>(
            TranslationError::AllBackendsFailed {
                attempts: vec![Attempt {
                    backend_id: "libre-main".into(),
                    failure: BackendFailure::Status {
                        code: 429,
                        message: "Too many requests".into(),
                    },
                }],
            },
        ));

        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({
                "status": "failed",
                "kind": "all_backends_failed",
                "message": "all translation services unavailable, retry later",
                "attempts": [{"backend": "libre-main", "reason": "HTTP 429: Too many requests"}]
            })
        );
    }
}

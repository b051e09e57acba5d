//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for translite.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::adapter::ProtocolKind;
use crate::language::detect::DEFAULT_CJK_THRESHOLD;
use crate::resilience::BackoffPolicy;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Language detection settings.
    pub detection: DetectionConfig,

    /// Attempt limits and overall time budget.
    pub dispatch: DispatchConfig,

    /// Failure threshold and cool-down curve.
    pub health: HealthConfig,

    /// Latency probing.
    pub probe: ProbeConfig,

    /// Outbound HTTP client settings.
    pub http: HttpConfig,

    /// Single-instance lock and control socket.
    pub instance: InstanceConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Translation backend definitions.
    pub backends: Vec<BackendConfig>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            dispatch: DispatchConfig::default(),
            health: HealthConfig::default(),
            probe: ProbeConfig::default(),
            http: HttpConfig::default(),
            instance: InstanceConfig::default(),
            observability: ObservabilityConfig::default(),
            backends: default_backends(),
        }
    }
}

/// Language detection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Text is Chinese when the CJK share of its non-whitespace characters exceeds this.
    pub cjk_threshold: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            cjk_threshold: DEFAULT_CJK_THRESHOLD,
        }
    }
}

/// Dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Maximum candidates tried per translation.
    pub max_attempts: usize,

    /// Wall-clock budget across all attempts in milliseconds.
    pub overall_timeout_ms: u64,

    /// Number of top-ranked candidates raced in parallel (1 = sequential).
    pub race_width: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            overall_timeout_ms: 10_000,
            race_width: 1,
        }
    }
}

/// Backend health configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Consecutive failures before a backend is cooled down.
    pub failure_threshold: u32,

    /// First cool-down in milliseconds.
    pub base_backoff_ms: u64,

    /// Cool-down cap in milliseconds.
    pub max_backoff_ms: u64,
}

impl HealthConfig {
    pub fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy::new(
            Duration::from_millis(self.base_backoff_ms),
            Duration::from_millis(self.max_backoff_ms),
        )
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            base_backoff_ms: 2_000,
            max_backoff_ms: 300_000,
        }
    }
}

/// Probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Enable latency probing (warm-up and periodic).
    pub enabled: bool,

    /// Probe timeout in milliseconds.
    pub timeout_ms: u64,

    /// Interval between periodic probe rounds in seconds.
    pub interval_secs: u64,

    /// Text translated by a probe.
    pub sample_text: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: 500,
            interval_secs: 60,
            sample_text: "Hello".to_string(),
        }
    }
}

/// Outbound HTTP configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User-Agent sent to every backend.
    pub user_agent: String,

    /// TCP connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            connect_timeout_ms: 3_000,
        }
    }
}

/// Single-instance configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InstanceConfig {
    /// Loopback address held by the running instance (lock + control socket).
    pub lock_address: String,

    /// Maximum concurrent control clients.
    pub max_clients: usize,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            lock_address: "127.0.0.1:47231".to_string(),
            max_clients: 16,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9464".to_string(),
        }
    }
}

/// Translation backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Unique backend identifier.
    pub id: String,

    /// Endpoint URL.
    pub endpoint: String,

    /// Wire protocol (default: libre).
    #[serde(default = "default_protocol")]
    pub protocol: ProtocolKind,

    /// Ranking priority, lower is preferred (default: 0).
    #[serde(default)]
    pub priority: u32,

    /// Per-attempt timeout in milliseconds.
    #[serde(default = "default_backend_timeout_ms")]
    pub timeout_ms: u64,

    /// Optional API key (LibreTranslate).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_protocol() -> ProtocolKind {
    ProtocolKind::Libre
}

fn default_backend_timeout_ms() -> u64 {
    4_000
}

const DEFAULT_LIBRE_MIRRORS: &[&str] = &[
    "https://libretranslate.de/translate",
    "https://translate.fedilab.app/translate",
    "https://translate.argosopentech.com/translate",
    "https://translate.astian.org/translate",
    "https://libretranslate.pussthcat.org/translate",
    "https://translate.mentality.rip/translate",
    "https://libretranslate.eownerdead.dedyn.io/translate",
];

/// Public LibreTranslate mirrors in preference order, then Google as last resort.
pub fn default_backends() -> Vec<BackendConfig> {
    let mut backends: Vec<BackendConfig> = DEFAULT_LIBRE_MIRRORS
        .iter()
        .enumerate()
        .map(|(i, endpoint)| BackendConfig {
            id: if i == 0 {
                "libre-main".to_string()
            } else {
                format!("libre-mirror-{}", i)
            },
            endpoint: endpoint.to_string(),
            protocol: ProtocolKind::Libre,
            priority: i as u32,
            timeout_ms: default_backend_timeout_ms(),
            api_key: None,
        })
        .collect();

    backends.push(BackendConfig {
        id: "google".to_string(),
        endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
        protocol: ProtocolKind::Google,
        priority: DEFAULT_LIBRE_MIRRORS.len() as u32,
        timeout_ms: default_backend_timeout_ms(),
        api_key: None,
    });

    backends
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_backend_entry() {
        let config: TranslatorConfig = toml::from_str(
            r#"
            [[backends]]
            id = "local"
            endpoint = "http://127.0.0.1:5000/translate"
            "#,
        )
        .unwrap();

        assert_eq!(config.backends.len(), 1);
        let backend = &config.backends[0];
        assert_eq!(backend.protocol, ProtocolKind::Libre);
        assert_eq!(backend.priority, 0);
        assert_eq!(backend.timeout_ms, 4_000);
        assert_eq!(config.dispatch.max_attempts, 3);
        assert_eq!(config.health.failure_threshold, 3);
    }

    #[test]
    fn test_defaults_follow_mirror_order() {
        let config = TranslatorConfig::default();
        assert_eq!(config.backends.len(), 8);
        assert_eq!(config.backends[0].id, "libre-main");
        assert_eq!(config.backends[7].protocol, ProtocolKind::Google);
        assert!(config
            .backends
            .windows(2)
            .all(|w| w[0].priority < w[1].priority));
    }

    #[test]
    fn test_full_sections() {
        let config: TranslatorConfig = toml::from_str(
            r#"
            [dispatch]
            max_attempts = 5
            overall_timeout_ms = 3000
            race_width = 2

            [health]
            failure_threshold = 1

            [probe]
            enabled = false

            [[backends]]
            id = "g"
            endpoint = "https://translate.googleapis.com/translate_a/single"
            protocol = "google"
            priority = 7
            timeout_ms = 1500
            "#,
        )
        .unwrap();

        assert_eq!(config.dispatch.race_width, 2);
        assert_eq!(config.health.failure_threshold, 1);
        assert_eq!(config.health.max_backoff_ms, 300_000);
        assert!(!config.probe.enabled);
        assert_eq!(config.backends[0].protocol, ProtocolKind::Google);
        assert_eq!(config.backends[0].timeout_ms, 1500);
    }
}

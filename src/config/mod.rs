//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), or built-in defaults when absent
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → TranslatorConfig (validated, immutable)
//!     → registry, orchestrator, daemon built from it once at startup
//! ```
//!
//! # Design Decisions
//! - Config is read once; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    BackendConfig, DetectionConfig, DispatchConfig, HealthConfig, HttpConfig, InstanceConfig,
    ObservabilityConfig, ProbeConfig, TranslatorConfig,
};

//! English/Chinese translation dispatch with backend fallback.

pub mod adapter;
pub mod config;
pub mod dispatch;
pub mod health;
pub mod language;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod registry;
pub mod resilience;

pub use config::TranslatorConfig;
pub use dispatch::{Orchestrator, TranslateOptions, TranslationError, TranslationResult};
pub use language::{Lang, LanguageDetector};
pub use lifecycle::Shutdown;
pub use registry::Registry;

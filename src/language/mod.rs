//! Language identification subsystem.
//!
//! # Data Flow
//! ```text
//! Selected text
//!     → detect.rs (dominant script heuristic)
//!     → Lang::En | Lang::Zh
//!     → Direction fixed: En → Zh, Zh → En
//! ```
//!
//! # Design Decisions
//! - Only English and Chinese are supported; the direction is always "the other one"
//! - Detection is pure and deterministic (no I/O, no model)

pub mod detect;

pub use detect::LanguageDetector;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A supported language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    En,
    Zh,
}

impl Lang {
    /// ISO 639-1 code used on the wire by every backend.
    pub fn code(self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Zh => "zh",
        }
    }

    /// The translation target for text written in `self`.
    pub fn opposite(self) -> Lang {
        match self {
            Lang::En => Lang::Zh,
            Lang::Zh => Lang::En,
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

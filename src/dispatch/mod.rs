//! Translation dispatch subsystem.
//!
//! # State Machine
//! ```text
//! Idle → Detecting → Dispatching(attempt i) → Succeeded
//!                                           → Dispatching(attempt i+1)
//!                                           → Failed
//! ```
//!
//! # Data Flow
//! ```text
//! translate(text)
//!     → reject empty input
//!     → language detector fixes (source, target)
//!     → registry: reactivate_expired(), list_candidates()
//!     → optional probe warm-up for ambiguous top candidates
//!     → attempts in ranked order (first success wins), bounded by
//!       max_attempts, per-backend timeout, overall budget, cancellation
//!     → TranslationResult | TranslationError
//! ```
//!
//! # Design Decisions
//! - Sequential fallback by default; racing only for the configured top N, losers dropped
//! - Only terminal outcomes cross this boundary; per-backend failures are recorded
//! - Cancellation is cooperative via a token checked at every dispatch boundary

pub mod error;
pub mod orchestrator;
pub mod request;
pub mod slot;

pub use error::{Attempt, TranslationError};
pub use orchestrator::{DispatchPolicy, Orchestrator};
pub use request::{TranslateOptions, TranslationRequest, TranslationResult};
pub use slot::RequestSlot;

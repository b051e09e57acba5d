//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Attempt against a backend:
//!     → timeouts.rs (per-backend deadline, overall request budget)
//!     → On failure: registry records it
//!     → backoff.rs (cool-down length once the failure threshold is hit)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every network call has a deadline
//! - Adapters never retry; fallback lives in the orchestrator only
//! - Cool-downs grow exponentially per streak and are capped

pub mod backoff;
pub mod timeouts;

pub use backoff::BackoffPolicy;
pub use timeouts::Deadline;

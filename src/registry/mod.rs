//! Backend registry subsystem.
//!
//! # Data Flow
//! ```text
//! Static configuration
//!     → pool.rs (Registry: one entry per backend, ids unique, config order kept)
//!     → backend.rs (per-entry health behind its own lock)
//!
//! Before each dispatch:
//!     reactivate_expired() → list_candidates()
//!         - drop entries still cooling down
//!         - order by priority, then last latency, then config order
//!
//! After each attempt:
//!     record_outcome() → failures counted, cool-down applied at threshold
//! ```
//!
//! # Design Decisions
//! - Entries are never removed at runtime, only cooled down
//! - One lock per entry so independent backends never contend
//! - Cool-down expiry is checked lazily; no timer task required

pub mod backend;
pub mod pool;

pub use backend::{Backend, BackendSnapshot, HealthState};
pub use pool::{Registry, RegistryError};

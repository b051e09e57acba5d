//! Backend probing subsystem.
//!
//! # Data Flow
//! ```text
//! Warm-up (probe.rs, from the orchestrator):
//!     Top candidates tied on priority with unknown latency
//!     → Probe concurrently, bounded by the probe timeout
//!     → Seed last_latency in the registry
//!
//! Periodic (monitor.rs, daemon only):
//!     Interval timer
//!     → Probe every current candidate
//!     → Seed last_latency in the registry
//! ```
//!
//! # Design Decisions
//! - Probes only rank; they never disable a backend
//! - Probe timeout is short and separate from the translation timeout
//! - Real dispatch never waits on a probe longer than that timeout

pub mod monitor;
pub mod probe;

pub use monitor::ProbeMonitor;
pub use probe::Prober;

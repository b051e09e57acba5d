//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Instance lock → HTTP client → Registry → Orchestrator
//!     → Metrics → Probe monitor → Control server
//!
//! Instance (instance.rs):
//!     Bind loopback lock address → held for the process lifetime
//!
//! Shutdown (shutdown.rs):
//!     Ctrl-C received → broadcast → control server and probe monitor exit
//! ```
//!
//! # Design Decisions
//! - Only one daemon per user session; a second launch exits quietly
//! - The lock socket doubles as the control socket
//! - Fail fast: any startup error is fatal

pub mod instance;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use instance::{InstanceError, InstanceLock};
pub use shutdown::Shutdown;
pub use startup::{run, StartupError};

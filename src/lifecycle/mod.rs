//! Service lifecycle subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Validate config → Bind loopback listener → directory.rs (register id)
//!     → Spawn server task
//!
//! Teardown:
//!     shutdown.rs (signal) → Stop accepting → Drain or abort after grace
//!     → directory.rs (unregister id) → verifier.rs (unmet expectations)
//! ```
//!
//! # Design Decisions
//! - Verification runs exactly once, after the listener has stopped
//! - The directory is an explicit object, not process-global state
//! - Pending requests past the grace period are aborted, not awaited

pub mod directory;
pub mod shutdown;
pub mod verifier;

pub use directory::{DirectoryError, ServiceDirectory, ServiceEntry};
pub use shutdown::Shutdown;
pub use verifier::{verify, UnmetExpectations};

//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ServiceConfig.bind_address (loopback, port 0 by default)
//!     → listener.rs (bind, resolve OS-assigned port)
//!     → Hand off to HTTP layer (axum::serve)
//! ```

pub mod listener;

pub use listener::{bind_loopback, ListenerError};

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! registry, engine, verifier, host
//!     → tracing events with structured fields
//!     → logging.rs (EnvFilter + fmt subscriber)
//!     → stdout / test output
//! ```
//!
//! # Design Decisions
//! - Structured fields (method, path, condition) rather than formatted strings
//! - Installing the subscriber is optional and idempotent, so tests can call it freely

pub mod logging;

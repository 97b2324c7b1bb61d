//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request (body buffered by the host)
//!     → engine.rs (ordered snapshot, first match wins)
//!     → matched registration's responder writes into sink.rs
//!     → Return: Handled | NoMatch | Error(cause)
//!
//! Host converts the sink into the HTTP response:
//!     Handled  → whatever the responder wrote
//!     NoMatch  → 404
//!     Error    → 500, body = failure text
//! ```
//!
//! # Design Decisions
//! - Deterministic: registration order is the only tie-break
//! - Per-request failures never cross the dispatch boundary
//! - No dispatch timeout; callers bound the wait from outside

pub mod engine;
pub mod sink;

pub use engine::{DispatchEngine, DispatchOutcome, ResponderFailure};
pub use sink::ResponseSink;

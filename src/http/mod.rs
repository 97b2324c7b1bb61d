//! HTTP host subsystem.
//!
//! # Data Flow
//! ```text
//! Loopback TCP connection
//!     → server.rs (axum, one fallback handler for every method and path)
//!     → buffer request body (bounded by body_limit_bytes)
//!     → DispatchEngine::dispatch
//!     → ResponseSink → HTTP response
//!
//! Test code
//!     → authoring.rs (on_request(...).respond_with(...), with_content_at, ...)
//!     → HandlerRegistry::register
//! ```

pub mod authoring;
pub mod server;

pub use authoring::ResponseBuilder;
pub use server::{FakeHttpService, ServiceBuilder, ServiceError};

//! In-process fake HTTP service for tests.
//!
//! Starts a real listener on an OS-assigned loopback port, routes each
//! request through registered predicate/responder pairs (first match wins)
//! and, on teardown, can fail when a registration was never exercised.
//!
//! ```no_run
//! use fake_http_service::FakeHttpService;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let service = FakeHttpService::builder().strict(true).start().await?;
//! service
//!     .on_request_described("GET /widgets", |req| req.uri().path() == "/widgets")
//!     .respond_with(|sink| async move {
//!         sink.write_str("[]");
//!         Ok(())
//!     });
//!
//! // ... exercise code that calls service.base_url() ...
//!
//! service.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatch;
pub mod handler;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::ServiceConfig;
pub use dispatch::{DispatchEngine, DispatchOutcome, ResponseSink};
pub use handler::{HandlerRegistry, InboundRequest, RegistrationHandle};
pub use http::{FakeHttpService, ResponseBuilder};
pub use lifecycle::{ServiceDirectory, UnmetExpectations};

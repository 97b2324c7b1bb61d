//! Handler registration subsystem.
//!
//! # Data Flow
//! ```text
//! Authoring layer (on_request / responds / fixtures)
//!     → registry.rs (atomic append, insertion order preserved)
//!     → registration.rs (predicate + responder + description + matched flag)
//!
//! Dispatch (per request):
//!     → registry.rs (ordered snapshot)
//!     → registration.rs (evaluate predicate, mark matched, respond)
//! ```
//!
//! # Design Decisions
//! - Registrations are never removed or reordered once appended
//! - The registry is an immutable vector swapped on append (readers never lock)
//! - `matched` is a per-registration atomic flag, monotonic false → true
//! - Predicates are opaque functions; descriptions are separate labels

pub mod registration;
pub mod registry;

pub use registration::{
    predicate, responder, BoxError, HandlerRegistration, InboundRequest, Predicate, Responder,
    ResponderFuture,
};
pub use registry::{HandlerRegistry, RegistrationHandle, RegistryError, Snapshot};

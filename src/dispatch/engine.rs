//! Match-first-wins dispatch over the handler registry.
//!
//! # Responsibilities
//! - Evaluate registrations in registration order against a request
//! - Mark the first match as used and run its responder
//! - Map "no registration matched" to 404
//! - Contain handler failures (responder errors, responder or predicate
//!   panics) as 500 responses

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use axum::http::StatusCode;
use futures_util::FutureExt;

use crate::dispatch::sink::ResponseSink;
use crate::handler::{BoxError, HandlerRegistration, HandlerRegistry, InboundRequest, Snapshot};

/// A handler did not complete normally.
#[derive(Debug, thiserror::Error)]
pub enum ResponderFailure {
    /// The responder returned an error.
    #[error("{0}")]
    Failed(BoxError),
    /// The responder panicked.
    #[error("responder panicked: {0}")]
    Panicked(String),
    /// A predicate panicked while being evaluated.
    #[error("predicate panicked: {0}")]
    PredicatePanicked(String),
}

/// Result of routing one request.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// A registration matched and its responder completed.
    Handled,
    /// No registration matched; the sink holds a 404.
    NoMatch,
    /// A predicate or the matched responder failed; the sink holds a 500.
    Error(ResponderFailure),
}

impl DispatchOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, DispatchOutcome::Handled)
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, DispatchOutcome::NoMatch)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, DispatchOutcome::Error(_))
    }
}

/// Routes requests through a [`HandlerRegistry`].
#[derive(Debug, Clone)]
pub struct DispatchEngine {
    registry: Arc<HandlerRegistry>,
}

impl DispatchEngine {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    /// Route `request` to the first matching registration.
    ///
    /// Never fails: every outcome is written into `sink` and reported through
    /// the returned [`DispatchOutcome`].
    pub async fn dispatch(&self, request: &InboundRequest, sink: &ResponseSink) -> DispatchOutcome {
        let snapshot = self.registry.snapshot_ordered();

        let registration = match find_match(&snapshot, request) {
            Ok(Some(registration)) => registration,
            Ok(None) => {
                sink.reset(StatusCode::NOT_FOUND);
                tracing::warn!(
                    method = %request.method(),
                    path = %request.uri().path(),
                    "No handler for request"
                );
                return DispatchOutcome::NoMatch;
            }
            Err((registration, message)) => {
                let failure = ResponderFailure::PredicatePanicked(message);
                return fail(request, sink, registration, failure);
            }
        };

        if registration.mark_matched() {
            tracing::debug!(
                index = registration.index(),
                condition = %registration.description(),
                "Condition matched for the first time"
            );
        }

        let result = AssertUnwindSafe(registration.respond(sink.clone()))
            .catch_unwind()
            .await;

        let failure = match result {
            Ok(Ok(())) => return DispatchOutcome::Handled,
            Ok(Err(e)) => ResponderFailure::Failed(e),
            Err(payload) => ResponderFailure::Panicked(panic_message(payload)),
        };
        fail(request, sink, registration, failure)
    }
}

/// First registration whose predicate accepts `request`, in order.
///
/// A panicking predicate stops the scan and is reported with its panic message.
fn find_match<'a>(
    snapshot: &'a Snapshot,
    request: &InboundRequest,
) -> Result<Option<&'a Arc<HandlerRegistration>>, (&'a Arc<HandlerRegistration>, String)> {
    for registration in snapshot.iter() {
        match panic::catch_unwind(AssertUnwindSafe(|| registration.matches(request))) {
            Ok(true) => return Ok(Some(registration)),
            Ok(false) => {}
            Err(payload) => return Err((registration, panic_message(payload))),
        }
    }
    Ok(None)
}

fn fail(
    request: &InboundRequest,
    sink: &ResponseSink,
    registration: &HandlerRegistration,
    failure: ResponderFailure,
) -> DispatchOutcome {
    tracing::error!(
        method = %request.method(),
        path = %request.uri().path(),
        condition = %registration.description(),
        error = %failure,
        "Handler failed"
    );

    sink.reset(StatusCode::INTERNAL_SERVER_ERROR);
    sink.write_str(&failure.to_string());
    DispatchOutcome::Error(failure)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

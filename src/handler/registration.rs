//! A single configured expectation.
//!
//! # Responsibilities
//! - Pair a match predicate with a response action
//! - Carry a human-readable description for diagnostics
//! - Track whether the expectation has been exercised

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::Request;
use futures_util::future::{BoxFuture, FutureExt};

use crate::dispatch::ResponseSink;

/// An inbound request with its body already buffered.
pub type InboundRequest = Request<Bytes>;

/// Failure type returned by responders.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Future produced by a responder invocation.
pub type ResponderFuture = BoxFuture<'static, Result<(), BoxError>>;

/// Pure test of whether a request satisfies a registration's condition.
pub type Predicate = Arc<dyn Fn(&InboundRequest) -> bool + Send + Sync>;

/// Writes a response into the sink once the predicate has matched.
pub type Responder = Arc<dyn Fn(ResponseSink) -> ResponderFuture + Send + Sync>;

/// Wrap a closure as a [`Predicate`].
pub fn predicate<F>(f: F) -> Predicate
where
    F: Fn(&InboundRequest) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wrap an async closure as a [`Responder`].
pub fn responder<F, Fut>(f: F) -> Responder
where
    F: Fn(ResponseSink) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    Arc::new(move |sink: ResponseSink| f(sink).boxed())
}

/// Predicate, responder and description, plus the "has been matched" flag.
///
/// Everything except `matched` is fixed at construction.
pub struct HandlerRegistration {
    /// Position in the owning registry.
    index: usize,
    predicate: Predicate,
    responder: Responder,
    description: String,
    matched: AtomicBool,
}

impl HandlerRegistration {
    pub(crate) fn new(
        index: usize,
        predicate: Predicate,
        responder: Responder,
        description: String,
    ) -> Self {
        Self {
            index,
            predicate,
            responder,
            description,
            matched: AtomicBool::new(false),
        }
    }

    /// Position of this registration in evaluation order.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns true once any request has matched this registration.
    pub fn is_matched(&self) -> bool {
        self.matched.load(Ordering::Acquire)
    }

    /// Evaluate the predicate. Does not touch the matched flag.
    pub fn matches(&self, request: &InboundRequest) -> bool {
        (self.predicate)(request)
    }

    /// Set the matched flag. Returns true only for the call that flipped it.
    pub(crate) fn mark_matched(&self) -> bool {
        !self.matched.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn respond(&self, sink: ResponseSink) -> ResponderFuture {
        (self.responder)(sink)
    }
}

impl fmt::Debug for HandlerRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistration")
            .field("index", &self.index)
            .field("description", &self.description)
            .field("matched", &self.is_matched())
            .finish_non_exhaustive()
    }
}

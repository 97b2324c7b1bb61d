//! Outbound response under construction.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::Response;
use serde::Serialize;

#[derive(Debug)]
struct PendingResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Default for PendingResponse {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }
}

/// Shared handle that responders write the response into.
///
/// Clones refer to the same response, so the dispatch engine keeps a handle
/// while the responder owns another.
#[derive(Debug, Clone, Default)]
pub struct ResponseSink {
    inner: Arc<Mutex<PendingResponse>>,
}

impl ResponseSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, PendingResponse> {
        // A responder that panicked mid-write leaves a usable response behind.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn status(&self) -> StatusCode {
        self.lock().status
    }

    pub fn set_status(&self, status: StatusCode) {
        self.lock().status = status;
    }

    /// Insert a header, replacing any previous value with the same name.
    pub fn insert_header(&self, name: HeaderName, value: HeaderValue) {
        self.lock().headers.insert(name, value);
    }

    pub fn header(&self, name: &HeaderName) -> Option<HeaderValue> {
        self.lock().headers.get(name).cloned()
    }

    /// Append bytes to the body.
    pub fn write(&self, bytes: impl AsRef<[u8]>) {
        self.lock().body.extend_from_slice(bytes.as_ref());
    }

    /// Append UTF-8 text to the body.
    pub fn write_str(&self, text: &str) {
        self.write(text.as_bytes());
    }

    /// Replace the body with `value` serialized as JSON.
    pub fn write_json<T: Serialize>(&self, value: &T) -> Result<(), serde_json::Error> {
        let encoded = serde_json::to_vec(value)?;
        let mut pending = self.lock();
        pending.body = encoded;
        pending
            .headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(())
    }

    /// Snapshot of the body written so far.
    pub fn body(&self) -> Bytes {
        Bytes::copy_from_slice(&self.lock().body)
    }

    /// Discard everything written so far and start over with `status`.
    pub(crate) fn reset(&self, status: StatusCode) {
        *self.lock() = PendingResponse {
            status,
            ..PendingResponse::default()
        };
    }

    /// Take the response out of the sink, leaving a fresh default behind.
    pub fn take_response(&self) -> Response {
        let pending = std::mem::take(&mut *self.lock());
        let mut response = Response::new(Body::from(pending.body));
        *response.status_mut() = pending.status;
        *response.headers_mut() = pending.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_empty_ok() {
        let sink = ResponseSink::new();
        assert_eq!(sink.status(), StatusCode::OK);
        assert!(sink.body().is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let sink = ResponseSink::new();
        let writer = sink.clone();

        writer.set_status(StatusCode::CREATED);
        writer.write_str("hello ");
        writer.write(b"world");

        assert_eq!(sink.status(), StatusCode::CREATED);
        assert_eq!(sink.body(), Bytes::from_static(b"hello world"));
    }

    #[test]
    fn test_reset_discards_previous_writes() {
        let sink = ResponseSink::new();
        sink.insert_header(header::ETAG, HeaderValue::from_static("\"v1\""));
        sink.write_str("partial");

        sink.reset(StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(sink.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(sink.body().is_empty());
        assert!(sink.header(&header::ETAG).is_none());
    }

    #[test]
    fn test_write_json_sets_content_type() {
        let sink = ResponseSink::new();
        sink.write_json(&serde_json::json!({ "id": 7 })).unwrap();

        assert_eq!(
            sink.header(&header::CONTENT_TYPE).unwrap(),
            HeaderValue::from_static("application/json")
        );
        assert_eq!(sink.body(), Bytes::from_static(br#"{"id":7}"#));
    }

    #[test]
    fn test_take_response() {
        let sink = ResponseSink::new();
        sink.set_status(StatusCode::ACCEPTED);
        sink.insert_header(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let response = sink.take_response();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");

        // The sink starts over after being taken
        assert_eq!(sink.status(), StatusCode::OK);
    }
}

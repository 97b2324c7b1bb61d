//! Fake HTTP service host.
//!
//! # Responsibilities
//! - Bind a loopback listener and expose the resolved base URL
//! - Serve every request through the dispatch engine
//! - Register/unregister the service in an optional directory
//! - Verify expectations exactly once at teardown

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use http_body_util::LengthLimitError;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use url::Url;
use uuid::Uuid;

use crate::config::validation::join_errors;
use crate::config::{validate_config, ServiceConfig, ValidationError};
use crate::dispatch::{DispatchEngine, DispatchOutcome, ResponseSink};
use crate::handler::HandlerRegistry;
use crate::lifecycle::{verify, DirectoryError, ServiceDirectory, Shutdown, UnmetExpectations};
use crate::net::{bind_loopback, ListenerError};

/// Error type for starting a fake service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("invalid configuration: {}", join_errors(.0))]
    Config(Vec<ValidationError>),
    #[error(transparent)]
    Listener(#[from] ListenerError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("invalid base address: {0}")]
    BaseUrl(#[from] url::ParseError),
}

/// State injected into the request handler.
#[derive(Clone)]
struct HostState {
    engine: DispatchEngine,
    body_limit: usize,
}

/// Builder for [`FakeHttpService`].
#[derive(Debug, Default)]
pub struct ServiceBuilder {
    config: ServiceConfig,
    directory: Option<ServiceDirectory>,
}

impl ServiceBuilder {
    /// Replace the whole configuration.
    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn service_id(mut self, service_id: impl Into<String>) -> Self {
        self.config.service_id = Some(service_id.into());
        self
    }

    pub fn bind_address(mut self, bind_address: impl Into<String>) -> Self {
        self.config.bind_address = bind_address.into();
        self
    }

    /// Fail teardown when a registration was never matched.
    pub fn strict(mut self, strict: bool) -> Self {
        self.config.strict = strict;
        self
    }

    pub fn body_limit_bytes(mut self, limit: usize) -> Self {
        self.config.body_limit_bytes = limit;
        self
    }

    pub fn shutdown_grace(mut self, grace: Duration) -> Self {
        self.config.shutdown_grace_ms = u64::try_from(grace.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Publish the running service in `directory` until teardown.
    pub fn directory(mut self, directory: ServiceDirectory) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Bind the listener and start serving.
    pub async fn start(self) -> Result<FakeHttpService, ServiceError> {
        let ServiceBuilder { config, directory } = self;
        validate_config(&config).map_err(ServiceError::Config)?;

        let (service_id, id_is_user_specified) = match config.service_id.clone() {
            Some(id) => (id, true),
            None => (Uuid::new_v4().to_string(), false),
        };

        let (listener, local_addr) = bind_loopback(&config.bind_address).await?;
        let base_url = Url::parse(&format!("http://{}/", local_addr))?;

        if let Some(directory) = &directory {
            directory.register(&service_id, base_url.clone())?;
        }

        let registry = Arc::new(HandlerRegistry::new());
        let engine = DispatchEngine::new(registry.clone());
        let app = build_router(engine, config.body_limit_bytes);

        let shutdown = Shutdown::new();
        let signal = shutdown.signalled();
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(signal)
                .await
            {
                tracing::error!(error = %e, "Fake service stopped with error");
            }
        });

        let service = FakeHttpService {
            service_id,
            id_is_user_specified,
            base_url,
            registry,
            strict: config.strict,
            grace: Duration::from_millis(config.shutdown_grace_ms),
            shutdown,
            server: Some(server),
            directory,
            finished: false,
        };

        tracing::info!(service = %service, strict = service.strict, "Fake service started");
        Ok(service)
    }
}

/// An ephemeral HTTP server that answers requests from registered handlers.
///
/// Tear it down with [`FakeHttpService::shutdown`] to get the verification
/// result back. Dropping it instead panics when strict verification fails.
pub struct FakeHttpService {
    service_id: String,
    id_is_user_specified: bool,
    base_url: Url,
    registry: Arc<HandlerRegistry>,
    strict: bool,
    grace: Duration,
    shutdown: Shutdown,
    server: Option<JoinHandle<()>>,
    directory: Option<ServiceDirectory>,
    finished: bool,
}

impl FakeHttpService {
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::default()
    }

    /// Start a service with the given configuration.
    pub async fn start(config: ServiceConfig) -> Result<Self, ServiceError> {
        Self::builder().config(config).start().await
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` against the base URL.
    pub fn url_for(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path)
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Stop the listener, leave the directory and verify expectations.
    ///
    /// In-flight requests get the configured grace period. After that the
    /// server task is aborted, but connection tasks it already spawned are
    /// not: a responder that never completes keeps its connection task (and
    /// the registry it holds) alive until the runtime shuts down.
    pub async fn shutdown(mut self) -> Result<(), UnmetExpectations> {
        self.shutdown.trigger();
        if let Some(mut server) = self.server.take() {
            if tokio::time::timeout(self.grace, &mut server).await.is_err() {
                tracing::warn!(
                    service = %self,
                    grace_ms = self.grace.as_millis() as u64,
                    "Requests still pending after grace period; aborting"
                );
                server.abort();
            }
        }
        self.finish()
    }

    fn finish(&mut self) -> Result<(), UnmetExpectations> {
        self.finished = true;
        if let Some(directory) = &self.directory {
            directory.unregister(&self.service_id);
        }
        tracing::info!(service = %self, "Fake service stopped");
        verify(&self.registry, self.strict, &format!("FakeHttpService {}", self))
    }
}

impl fmt::Display for FakeHttpService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.id_is_user_specified {
            write!(f, "\"{}\" @ {}", self.service_id, self.base_url)
        } else {
            write!(f, "@ {}", self.base_url)
        }
    }
}

impl fmt::Debug for FakeHttpService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeHttpService")
            .field("service_id", &self.service_id)
            .field("base_url", &self.base_url.as_str())
            .field("strict", &self.strict)
            .field("registrations", &self.registry.len())
            .finish()
    }
}

impl Drop for FakeHttpService {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        self.shutdown.trigger();
        if let Some(server) = self.server.take() {
            server.abort();
        }
        if let Err(unmet) = self.finish() {
            if !std::thread::panicking() {
                panic!("{}", unmet);
            }
        }
    }
}

/// Build the axum router that hands every request to `engine`.
pub fn build_router(engine: DispatchEngine, body_limit: usize) -> Router {
    Router::new()
        .fallback(dispatch_handler)
        .with_state(HostState { engine, body_limit })
        .layer(TraceLayer::new_for_http())
}

async fn dispatch_handler(State(state): State<HostState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, state.body_limit).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(
                method = %parts.method,
                path = %parts.uri.path(),
                error = %e,
                "Failed to buffer request body"
            );
            return if exceeds_length_limit(&e) {
                (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response()
            } else {
                (StatusCode::BAD_REQUEST, "Failed to read request body").into_response()
            };
        }
    };
    let request = Request::from_parts(parts, bytes);

    let sink = ResponseSink::new();
    let outcome = state.engine.dispatch(&request, &sink).await;

    tracing::debug!(
        method = %request.method(),
        path = %request.uri().path(),
        status = sink.status().as_u16(),
        handled = matches!(outcome, DispatchOutcome::Handled),
        "Request dispatched"
    );

    sink.take_response()
}

fn exceeds_length_limit(err: &axum::Error) -> bool {
    let mut source = StdError::source(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

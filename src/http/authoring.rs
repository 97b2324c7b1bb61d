//! Fluent registration surface.
//!
//! Thin sugar over [`HandlerRegistry`](crate::handler::HandlerRegistry):
//! every method here ends in exactly one registration.

use std::future::Future;

use axum::http::{header, HeaderValue, Method, StatusCode};
use url::Url;

use crate::config::{RouteFixture, ValidationError};
use crate::dispatch::ResponseSink;
use crate::handler::{predicate, responder, BoxError, InboundRequest, Predicate, RegistrationHandle};
use crate::http::server::FakeHttpService;

/// Pending registration: a predicate waiting for its response.
#[must_use = "nothing is registered until a respond method is called"]
pub struct ResponseBuilder<'a> {
    service: &'a FakeHttpService,
    predicate: Predicate,
    description: String,
}

impl<'a> ResponseBuilder<'a> {
    /// Replace the description used in diagnostics and verification failures.
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Register `respond` for requests matching the predicate.
    pub fn respond_with<F, Fut>(self, respond: F) -> RegistrationHandle
    where
        F: Fn(ResponseSink) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.service
            .registry()
            .append(self.predicate, responder(respond), self.description)
    }

    /// Like [`respond_with`](Self::respond_with), also passing the service base URL.
    pub fn respond_with_base<F, Fut>(self, respond: F) -> RegistrationHandle
    where
        F: Fn(ResponseSink, Url) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        let base_url = self.service.base_url().clone();
        self.respond_with(move |sink| respond(sink, base_url.clone()))
    }

    /// Answer matching requests with 200 and an empty body.
    pub fn succeed(self) -> RegistrationHandle {
        self.respond_status(StatusCode::OK)
    }

    /// Answer matching requests with 500 and an empty body.
    pub fn fail(self) -> RegistrationHandle {
        self.respond_status(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn respond_status(self, status: StatusCode) -> RegistrationHandle {
        self.respond_with(move |sink| async move {
            sink.set_status(status);
            Ok(())
        })
    }
}

impl FakeHttpService {
    /// Start a registration for requests matching `condition`.
    ///
    /// The description defaults to the predicate's type name; use
    /// [`ResponseBuilder::described`] or [`on_request_described`](Self::on_request_described)
    /// for something readable.
    pub fn on_request<P>(&self, condition: P) -> ResponseBuilder<'_>
    where
        P: Fn(&InboundRequest) -> bool + Send + Sync + 'static,
    {
        ResponseBuilder {
            service: self,
            predicate: predicate(condition),
            description: std::any::type_name::<P>().to_string(),
        }
    }

    pub fn on_request_described<P>(
        &self,
        description: impl Into<String>,
        condition: P,
    ) -> ResponseBuilder<'_>
    where
        P: Fn(&InboundRequest) -> bool + Send + Sync + 'static,
    {
        self.on_request(condition).described(description)
    }

    /// Register `respond_with` for requests matching `when`.
    pub fn responds<P, F, Fut>(&self, when: P, respond_with: F) -> RegistrationHandle
    where
        P: Fn(&InboundRequest) -> bool + Send + Sync + 'static,
        F: Fn(ResponseSink) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.on_request(when).respond_with(respond_with)
    }

    /// Answer every request not matched by an earlier registration with 500.
    pub fn fail_on_unexpected_request(&self) -> RegistrationHandle {
        self.on_request_described("any request", |_| true).fail()
    }

    /// Serve `content` (UTF-8) for requests whose URI ends with `relative_uri`.
    pub fn with_content_at(
        &self,
        relative_uri: impl Into<String>,
        content: impl Into<String>,
    ) -> RegistrationHandle {
        let relative_uri = relative_uri.into();
        let content = content.into();
        let description = format!("request URI ends with {:?}", relative_uri);

        self.on_request_described(description, move |req| {
            req.uri().to_string().ends_with(relative_uri.as_str())
        })
        .respond_with(move |sink| {
            sink.write_str(&content);
            async { Ok(()) }
        })
    }

    /// Register one canned route per fixture, in order.
    pub fn with_fixture_routes(
        &self,
        routes: &[RouteFixture],
    ) -> Result<Vec<RegistrationHandle>, ValidationError> {
        routes
            .iter()
            .enumerate()
            .map(|(index, route)| self.with_fixture_route(index, route))
            .collect()
    }

    fn with_fixture_route(
        &self,
        index: usize,
        route: &RouteFixture,
    ) -> Result<RegistrationHandle, ValidationError> {
        let status = StatusCode::from_u16(route.status).map_err(|_| {
            ValidationError::InvalidStatus {
                index,
                status: route.status,
            }
        })?;
        let method = route
            .method
            .as_deref()
            .map(|m| {
                Method::from_bytes(m.as_bytes()).map_err(|_| ValidationError::InvalidMethod {
                    index,
                    method: m.to_string(),
                })
            })
            .transpose()?;
        let content_type = route
            .content_type
            .as_deref()
            .map(|ct| {
                HeaderValue::from_str(ct).map_err(|_| ValidationError::InvalidContentType {
                    index,
                    content_type: ct.to_string(),
                })
            })
            .transpose()?;

        let description = match &method {
            Some(m) => format!("{} request URI ends with {:?}", m, route.path_suffix),
            None => format!("request URI ends with {:?}", route.path_suffix),
        };
        let suffix = route.path_suffix.clone();
        let body = route.body.clone();

        Ok(self
            .on_request_described(description, move |req| {
                method.as_ref().map_or(true, |m| req.method() == m)
                    && req.uri().to_string().ends_with(suffix.as_str())
            })
            .respond_with(move |sink| {
                sink.set_status(status);
                if let Some(content_type) = &content_type {
                    sink.insert_header(header::CONTENT_TYPE, content_type.clone());
                }
                sink.write_str(&body);
                async { Ok(()) }
            }))
    }
}

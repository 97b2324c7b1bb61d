//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Keep fake services on loopback addresses
//! - Check fixture routes carry valid HTTP methods and statuses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function of the config

use std::net::SocketAddr;

use axum::http::{HeaderValue, Method, StatusCode};

use crate::config::schema::{FixtureFile, RouteFixture, ServiceConfig};

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("bind_address {0:?} is not a socket address")]
    InvalidBindAddress(String),
    #[error("bind_address {0} is not a loopback address")]
    NonLoopbackBind(String),
    #[error("service_id must not be empty")]
    EmptyServiceId,
    #[error("body_limit_bytes must be greater than zero")]
    ZeroBodyLimit,
    #[error("route {index}: path_suffix must not be empty")]
    EmptyPathSuffix { index: usize },
    #[error("route {index}: {method:?} is not an HTTP method")]
    InvalidMethod { index: usize, method: String },
    #[error("route {index}: {status} is not an HTTP status code")]
    InvalidStatus { index: usize, status: u16 },
    #[error("route {index}: {content_type:?} is not a valid header value")]
    InvalidContentType { index: usize, content_type: String },
}

pub(crate) fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validate service settings.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let errors = service_errors(config);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a fixture file: its service section and every route.
pub fn validate_fixtures(fixtures: &FixtureFile) -> Result<(), Vec<ValidationError>> {
    let mut errors = service_errors(&fixtures.service);
    for (index, route) in fixtures.routes.iter().enumerate() {
        errors.extend(route_errors(index, route));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn service_errors(config: &ServiceConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    match config.bind_address.parse::<SocketAddr>() {
        Ok(addr) if !addr.ip().is_loopback() => {
            errors.push(ValidationError::NonLoopbackBind(config.bind_address.clone()))
        }
        Ok(_) => {}
        Err(_) => errors.push(ValidationError::InvalidBindAddress(config.bind_address.clone())),
    }

    if matches!(config.service_id.as_deref(), Some(id) if id.trim().is_empty()) {
        errors.push(ValidationError::EmptyServiceId);
    }

    if config.body_limit_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    errors
}

fn route_errors(index: usize, route: &RouteFixture) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if route.path_suffix.is_empty() {
        errors.push(ValidationError::EmptyPathSuffix { index });
    }
    if let Some(method) = &route.method {
        if Method::from_bytes(method.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidMethod {
                index,
                method: method.clone(),
            });
        }
    }
    if StatusCode::from_u16(route.status).is_err() {
        errors.push(ValidationError::InvalidStatus {
            index,
            status: route.status,
        });
    }
    if let Some(content_type) = &route.content_type {
        if HeaderValue::from_str(content_type).is_err() {
            errors.push(ValidationError::InvalidContentType {
                index,
                content_type: content_type.clone(),
            });
        }
    }

    errors
}

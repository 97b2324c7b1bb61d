//! End-of-life expectation verification.
//!
//! # Responsibilities
//! - Find registrations that no request ever matched
//! - Report all of them in a single failure
//!
//! # Design Decisions
//! - Non-strict verification always succeeds
//! - Read-only: never mutates the registry

use crate::handler::HandlerRegistry;

/// Registrations that were set up but never exercised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{service} expected requests\n{}\nbut they were not made.", .descriptions.join("\n"))]
pub struct UnmetExpectations {
    /// Label of the service that failed verification.
    pub service: String,
    /// Descriptions of the unmatched registrations, in registration order.
    pub descriptions: Vec<String>,
}

/// Check that every registration in `registry` was matched at least once.
///
/// With `strict` unset this always succeeds. `service` labels the failure.
pub fn verify(
    registry: &HandlerRegistry,
    strict: bool,
    service: &str,
) -> Result<(), UnmetExpectations> {
    if !strict {
        return Ok(());
    }

    let descriptions: Vec<String> = registry
        .unused()
        .iter()
        .map(|r| r.description().to_string())
        .collect();

    if descriptions.is_empty() {
        return Ok(());
    }

    let unmet = UnmetExpectations {
        service: service.to_string(),
        descriptions,
    };
    tracing::error!(
        service = %unmet.service,
        unmet = unmet.descriptions.len(),
        "{}",
        unmet
    );
    Err(unmet)
}

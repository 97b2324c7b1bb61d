//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from fixture files.

use serde::{Deserialize, Serialize};

/// Settings for one fake service instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Stable identifier; a UUID is generated when absent.
    pub service_id: Option<String>,

    /// Loopback address to bind; port 0 lets the OS choose.
    pub bind_address: String,

    /// Fail teardown when any registration was never matched.
    pub strict: bool,

    /// Largest request body buffered for predicates.
    pub body_limit_bytes: usize,

    /// How long teardown waits for in-flight requests before aborting them.
    pub shutdown_grace_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service_id: None,
            bind_address: "127.0.0.1:0".to_string(),
            strict: false,
            body_limit_bytes: 2 * 1024 * 1024,
            shutdown_grace_ms: 1_000,
        }
    }
}

/// A fixture file: service settings plus canned routes.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FixtureFile {
    pub service: ServiceConfig,
    pub routes: Vec<RouteFixture>,
}

/// A canned response served when the request URI ends with `path_suffix`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteFixture {
    /// Suffix the request URI must end with.
    pub path_suffix: String,

    /// Restrict to one HTTP method (any method when absent).
    #[serde(default)]
    pub method: Option<String>,

    /// Response status code.
    #[serde(default = "default_status")]
    pub status: u16,

    /// Response body, sent as UTF-8.
    #[serde(default)]
    pub body: String,

    /// Optional Content-Type header.
    #[serde(default)]
    pub content_type: Option<String>,
}

fn default_status() -> u16 {
    200
}

//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! fixture file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → FixtureFile { service: ServiceConfig, routes: [RouteFixture] }
//!
//! In tests, ServiceConfig is usually built in code:
//!     ServiceConfig::default() → tweak fields → validation.rs → start
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Validation reports every problem, not just the first

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_fixtures, parse_fixtures, ConfigError};
pub use schema::{FixtureFile, RouteFixture, ServiceConfig};
pub use validation::{validate_config, validate_fixtures, ValidationError};

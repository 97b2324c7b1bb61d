//! Fixture loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::FixtureFile;
use crate::config::validation::{join_errors, validate_fixtures, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// Parse and validate a fixture document.
pub fn parse_fixtures(content: &str) -> Result<FixtureFile, ConfigError> {
    let fixtures: FixtureFile = toml::from_str(content)?;
    validate_fixtures(&fixtures).map_err(ConfigError::Validation)?;
    Ok(fixtures)
}

/// Load and validate a fixture file.
pub fn load_fixtures(path: &Path) -> Result<FixtureFile, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_fixtures(&content)
}

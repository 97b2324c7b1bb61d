//! Shared utilities for integration tests.

use std::io::Write;

use tempfile::NamedTempFile;

/// HTTP client that never pools connections or goes through a proxy.
pub fn client() -> reqwest::Client {
    fake_http_service::observability::logging::init();
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Write `content` to a temporary `.toml` file that lives as long as the handle.
#[allow(dead_code)]
pub fn fixture_file(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

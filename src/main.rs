//! Standalone fake HTTP service.
//!
//! Serves canned routes from a TOML fixture file until Ctrl+C, then
//! verifies that every route was requested when `--strict` is set.
//!
//! ```text
//! fake-http --fixtures routes.toml --strict
//! ```

use std::path::PathBuf;

use clap::Parser;

use fake_http_service::config::{load_fixtures, FixtureFile};
use fake_http_service::observability::logging;
use fake_http_service::FakeHttpService;

#[derive(Parser)]
#[command(name = "fake-http")]
#[command(about = "Ephemeral fake HTTP service serving canned fixtures", long_about = None)]
struct Cli {
    /// TOML file with a [service] section and [[routes]] entries.
    #[arg(short, long)]
    fixtures: Option<PathBuf>,

    /// Loopback address to bind (overrides the fixture file).
    #[arg(short, long)]
    bind: Option<String>,

    /// Service identifier (overrides the fixture file).
    #[arg(long)]
    id: Option<String>,

    /// Fail on exit when a route was never requested.
    #[arg(long)]
    strict: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_default("fake_http_service=info,tower_http=info");

    let cli = Cli::parse();

    let FixtureFile { mut service, routes } = match &cli.fixtures {
        Some(path) => load_fixtures(path)?,
        None => FixtureFile::default(),
    };
    if let Some(bind) = cli.bind {
        service.bind_address = bind;
    }
    if let Some(id) = cli.id {
        service.service_id = Some(id);
    }
    service.strict |= cli.strict;

    tracing::info!(
        bind_address = %service.bind_address,
        strict = service.strict,
        routes = routes.len(),
        "Configuration loaded"
    );

    let fake = FakeHttpService::start(service).await?;
    fake.with_fixture_routes(&routes)?;

    println!("{}", fake.base_url());

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    fake.shutdown().await?;
    Ok(())
}

//! Loopback listener binding.
//!
//! # Responsibilities
//! - Parse the configured bind address
//! - Refuse anything that is not a loopback address
//! - Bind and report the resolved local address

use std::net::SocketAddr;

use tokio::net::TcpListener;

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// The bind address could not be parsed.
    #[error("invalid bind address {address:?}: {source}")]
    Address {
        address: String,
        source: std::net::AddrParseError,
    },
    /// The bind address is not on a loopback interface.
    #[error("refusing to bind non-loopback address {0}")]
    NotLoopback(SocketAddr),
    /// Failed to bind to address.
    #[error("failed to bind: {0}")]
    Bind(#[from] std::io::Error),
}

/// Bind a TCP listener on a loopback address.
///
/// Returns the listener together with the address actually bound, which
/// carries the OS-assigned port when the configured port is 0.
pub async fn bind_loopback(bind_address: &str) -> Result<(TcpListener, SocketAddr), ListenerError> {
    let addr: SocketAddr = bind_address
        .parse()
        .map_err(|source| ListenerError::Address {
            address: bind_address.to_string(),
            source,
        })?;

    if !addr.ip().is_loopback() {
        return Err(ListenerError::NotLoopback(addr));
    }

    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(address = %local_addr, "Listener bound");

    Ok((listener, local_addr))
}

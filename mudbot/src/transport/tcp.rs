//! Connection setup.

use std::time::Duration;

use log::{debug, info};
use tokio::net::TcpStream;

use crate::error::{Result, TransportError};

/// Open a TCP connection to `host:port`, giving up after `timeout`.
pub async fn connect(host: &str, port: u16, timeout: Duration) -> Result<TcpStream> {
    debug!("connecting to {}:{} (timeout {:?})", host, port, timeout);

    let stream = tokio::time::timeout(timeout, TcpStream::connect((host, port)))
        .await
        .map_err(|_| TransportError::Timeout(timeout))?
        .map_err(|source| TransportError::ConnectionFailed {
            host: host.to_string(),
            port,
            source,
        })?;

    // Prompts are short writes; don't let Nagle hold our replies back.
    stream.set_nodelay(true).map_err(TransportError::Io)?;

    info!("connected to {}:{}", host, port);
    Ok(stream)
}

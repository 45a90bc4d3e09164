//! DNS over TCP (RFC 1035 §4.2.2): every message is prefixed with a
//! two-byte big-endian length. The frame helpers are shared by the upstream
//! exchange, the zone-transfer proxy, and the TCP listener loop.

use splitdns_domain::EngineError;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

pub(crate) async fn connect(
    server: SocketAddr,
    timeout: Duration,
) -> Result<TcpStream, EngineError> {
    let stream = tokio::time::timeout(timeout, TcpStream::connect(server))
        .await
        .map_err(|_| EngineError::ExchangeTimeout { server })?
        .map_err(|e| io_error(server, e))?;
    stream.set_nodelay(true).map_err(|e| io_error(server, e))?;
    Ok(stream)
}

/// Single request/response exchange over a fresh connection. Connections
/// are intentionally not reused across requests.
pub(crate) async fn exchange(
    server: SocketAddr,
    request_bytes: &[u8],
    timeout: Duration,
) -> Result<Vec<u8>, EngineError> {
    let mut stream = connect(server, timeout).await?;

    tokio::time::timeout(timeout, write_frame(&mut stream, request_bytes))
        .await
        .map_err(|_| EngineError::ExchangeTimeout { server })?
        .map_err(|e| io_error(server, e))?;

    let response = tokio::time::timeout(timeout, read_frame(&mut stream))
        .await
        .map_err(|_| EngineError::ExchangeTimeout { server })?
        .map_err(|e| io_error(server, e))?;

    Ok(response)
}

pub async fn write_frame<S>(stream: &mut S, message_bytes: &[u8]) -> io::Result<()>
where
    S: AsyncWriteExt + Unpin,
{
    let length = u16::try_from(message_bytes.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "message exceeds 65535 bytes"))?;
    stream.write_all(&length.to_be_bytes()).await?;
    stream.write_all(message_bytes).await?;
    stream.flush().await
}

pub async fn read_frame<S>(stream: &mut S) -> io::Result<Vec<u8>>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await?;
    let length = u16::from_be_bytes(len_buf) as usize;

    let mut message = vec![0u8; length];
    stream.read_exact(&mut message).await?;
    Ok(message)
}

fn io_error(server: SocketAddr, e: io::Error) -> EngineError {
    EngineError::ExchangeIo {
        server,
        detail: e.to_string(),
    }
}

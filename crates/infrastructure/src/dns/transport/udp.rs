//! DNS over UDP. Messages go out unframed; responses are read from the
//! connected socket so stray datagrams from other peers are rejected by the
//! kernel.

use splitdns_domain::EngineError;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;

/// Largest response we accept over UDP, assuming EDNS(0).
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

pub(crate) async fn exchange(
    server: SocketAddr,
    request_bytes: &[u8],
    timeout: Duration,
) -> Result<Vec<u8>, EngineError> {
    // Ephemeral local port, family matching the upstream.
    let bind_addr: SocketAddr = if server.is_ipv4() {
        "0.0.0.0:0".parse().expect("static addr")
    } else {
        "[::]:0".parse().expect("static addr")
    };

    let socket = UdpSocket::bind(bind_addr).await.map_err(|e| io_error(server, e))?;
    socket
        .connect(server)
        .await
        .map_err(|e| io_error(server, e))?;

    tokio::time::timeout(timeout, socket.send(request_bytes))
        .await
        .map_err(|_| EngineError::ExchangeTimeout { server })?
        .map_err(|e| io_error(server, e))?;

    let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
    let received = tokio::time::timeout(timeout, socket.recv(&mut recv_buf))
        .await
        .map_err(|_| EngineError::ExchangeTimeout { server })?
        .map_err(|e| io_error(server, e))?;

    recv_buf.truncate(received);
    Ok(recv_buf)
}

fn io_error(server: SocketAddr, e: std::io::Error) -> EngineError {
    EngineError::ExchangeIo {
        server,
        detail: e.to_string(),
    }
}

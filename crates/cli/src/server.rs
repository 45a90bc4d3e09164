//! The two listener loops. UDP and TCP bind the same configured address and
//! share one engine; each datagram and each connection is handled on its
//! own task, so a slow upstream for one request never stalls the others.

use anyhow::Context;
use async_trait::async_trait;
use hickory_proto::op::Message;
use splitdns_domain::{EngineError, TransportKind};
use splitdns_infrastructure::dns::transport::tcp::{read_frame, write_frame};
use splitdns_infrastructure::dns::{QueryEngine, ResponseSink};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tracing::{error, info, warn};

const MAX_UDP_QUERY_SIZE: usize = 4096;

pub async fn run_udp_listener(engine: Arc<QueryEngine>, listen: SocketAddr) -> anyhow::Result<()> {
    let socket = Arc::new(
        UdpSocket::bind(listen)
            .await
            .with_context(|| format!("failed to bind UDP listener on {listen}"))?,
    );
    info!(listen = %listen, "UDP listener ready");

    let mut recv_buf = [0u8; MAX_UDP_QUERY_SIZE];
    loop {
        let (received, peer) = match socket.recv_from(&mut recv_buf).await {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, "UDP recv error");
                continue;
            }
        };
        let request = match Message::from_vec(&recv_buf[..received]) {
            Ok(request) => request,
            Err(e) => {
                // No usable id to correlate a reply to.
                warn!(client = %peer, error = %e, "dropping unparseable datagram");
                continue;
            }
        };

        let engine = engine.clone();
        let socket = socket.clone();
        tokio::spawn(async move {
            let mut sink = UdpSink { socket, peer };
            engine
                .handle(request, TransportKind::Datagram, peer, &mut sink)
                .await;
        });
    }
}

pub async fn run_tcp_listener(engine: Arc<QueryEngine>, listen: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(listen)
        .await
        .with_context(|| format!("failed to bind TCP listener on {listen}"))?;
    info!(listen = %listen, "TCP listener ready");

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, "TCP accept error");
                continue;
            }
        };
        let engine = engine.clone();
        tokio::spawn(serve_stream(stream, peer, engine));
    }
}

/// One TCP connection may carry several queries in sequence; the connection
/// ends on client EOF, a read error, or an unparseable frame.
async fn serve_stream(mut stream: TcpStream, peer: SocketAddr, engine: Arc<QueryEngine>) {
    loop {
        let frame = match read_frame(&mut stream).await {
            Ok(frame) => frame,
            Err(_) => return,
        };
        let request = match Message::from_vec(&frame) {
            Ok(request) => request,
            Err(e) => {
                warn!(client = %peer, error = %e, "dropping connection after unparseable frame");
                return;
            }
        };

        let mut sink = TcpSink {
            stream: &mut stream,
        };
        engine
            .handle(request, TransportKind::Stream, peer, &mut sink)
            .await;
    }
}

struct UdpSink {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
}

#[async_trait]
impl ResponseSink for UdpSink {
    async fn send(&mut self, message: &[u8]) -> Result<(), EngineError> {
        self.socket
            .send_to(message, self.peer)
            .await
            .map_err(|e| EngineError::ClientGone(e.to_string()))?;
        Ok(())
    }
}

struct TcpSink<'a> {
    stream: &'a mut TcpStream,
}

#[async_trait]
impl ResponseSink for TcpSink<'_> {
    async fn send(&mut self, message: &[u8]) -> Result<(), EngineError> {
        write_frame(self.stream, message)
            .await
            .map_err(|e| EngineError::ClientGone(e.to_string()))
    }
}

//! Upstream exchange primitives. One request, one response, over whichever
//! transport the client itself used. No pooling and no retries here: a
//! failed exchange is reported to the caller, which decides whether another
//! candidate exists.

pub mod tcp;
pub mod udp;

use hickory_proto::op::Message;
use splitdns_domain::{EngineError, TransportKind};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::debug;

/// Perform a single request/response exchange with `server`, mirroring the
/// client's transport kind. The response is parsed and its id checked
/// against the query before it is handed back.
pub(crate) async fn exchange(
    kind: TransportKind,
    server: SocketAddr,
    request: &Message,
    timeout: Duration,
) -> Result<Message, EngineError> {
    let request_bytes = request
        .to_vec()
        .map_err(|e| EngineError::Encode(e.to_string()))?;

    let response_bytes = match kind {
        TransportKind::Datagram => udp::exchange(server, &request_bytes, timeout).await?,
        TransportKind::Stream => tcp::exchange(server, &request_bytes, timeout).await?,
    };

    let response = Message::from_vec(&response_bytes).map_err(|e| {
        EngineError::BadUpstreamMessage {
            server,
            detail: e.to_string(),
        }
    })?;

    if response.id() != request.id() {
        return Err(EngineError::ResponseIdMismatch { server });
    }

    debug!(
        server = %server,
        transport = %kind,
        answers = response.answers().len(),
        "upstream exchange complete"
    );
    Ok(response)
}

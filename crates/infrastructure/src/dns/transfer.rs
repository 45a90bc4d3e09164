//! Zone-transfer proxying. We open an inbound transfer session to the
//! forwarder's address over TCP and relay each envelope to the client as it
//! arrives. The relay is append-only: envelopes already written are never
//! retracted, and an upstream error after a partial transfer simply ends
//! the session with a failure reply appended.

use super::sink::ResponseSink;
use super::transport::tcp;
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::RecordType;
use splitdns_domain::EngineError;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::debug;

/// Relay a full or incremental transfer from `server` to the client.
/// Returns the number of envelopes relayed.
pub(crate) async fn proxy(
    server: SocketAddr,
    request: &Message,
    timeout: Duration,
    sink: &mut dyn ResponseSink,
) -> Result<u64, EngineError> {
    let request_bytes = request
        .to_vec()
        .map_err(|e| EngineError::Encode(e.to_string()))?;

    let mut upstream = tcp::connect(server, timeout).await?;
    tokio::time::timeout(timeout, tcp::write_frame(&mut upstream, &request_bytes))
        .await
        .map_err(|_| EngineError::ExchangeTimeout { server })?
        .map_err(|e| io_error(server, e))?;

    // An AXFR stream opens and closes with the zone's SOA record; the
    // second SOA marks the final envelope. A reply whose first record is
    // not an SOA is a plain single-message answer (an error, or an
    // up-to-date IXFR), so nothing more will follow it.
    let mut soa_seen = 0u32;
    let mut envelopes = 0u64;
    loop {
        let frame = match tokio::time::timeout(timeout, tcp::read_frame(&mut upstream)).await {
            Ok(Ok(frame)) => frame,
            // Upstream closing after the data it had is a normal end of
            // session, as long as we relayed something.
            Ok(Err(e)) if envelopes > 0 && e.kind() == io::ErrorKind::UnexpectedEof => break,
            Ok(Err(e)) => return Err(io_error(server, e)),
            Err(_) => return Err(EngineError::ExchangeTimeout { server }),
        };

        let envelope =
            Message::from_vec(&frame).map_err(|e| EngineError::BadUpstreamMessage {
                server,
                detail: e.to_string(),
            })?;

        sink.send(&frame).await?;
        envelopes += 1;

        if envelope.response_code() != ResponseCode::NoError {
            break;
        }
        let answers = envelope.answers();
        if envelopes == 1 && answers.first().map(|r| r.record_type()) != Some(RecordType::SOA) {
            break;
        }
        soa_seen += answers
            .iter()
            .filter(|r| r.record_type() == RecordType::SOA)
            .count() as u32;
        if soa_seen >= 2 {
            break;
        }
    }

    debug!(server = %server, envelopes, "transfer relay complete");
    Ok(envelopes)
}

fn io_error(server: SocketAddr, e: io::Error) -> EngineError {
    EngineError::ExchangeIo {
        server,
        detail: e.to_string(),
    }
}

use super::failure::{respond_failure, FailureReason};
use super::sink::ResponseSink;
use super::{forwarder, recursor};
use hickory_proto::op::Message;
use splitdns_domain::{RoutingTable, TransportKind};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The per-request dispatch point. Stateless apart from the shared
/// read-only routing table, so the listeners can call it concurrently
/// without any locking.
pub struct QueryEngine {
    table: Arc<RoutingTable>,
    timeout: Duration,
}

impl QueryEngine {
    pub fn new(table: Arc<RoutingTable>, timeout: Duration) -> Self {
        Self { table, timeout }
    }

    /// Resolve one request and answer it through `sink`. Every path ends in
    /// a reply: a forwarded or recursed answer, or a failure response.
    pub async fn handle(
        &self,
        request: Message,
        transport: TransportKind,
        peer: SocketAddr,
        sink: &mut dyn ResponseSink,
    ) {
        let Some(question) = request.queries().first() else {
            warn!(client = %peer, transport = %transport, "refused request with empty question");
            respond_failure(sink, &request, FailureReason::EmptyQuestion).await;
            return;
        };

        let qname = question.name().to_utf8();
        debug!(domain = %qname, client = %peer, transport = %transport, "received request");

        if let Some(rule) = self.table.find_rule(&qname) {
            // A matched forward is final: no fall-through to recursion,
            // even when the forwarder errors.
            forwarder::forward(rule, &request, transport, self.timeout, sink).await;
            return;
        }

        info!(domain = %qname, "no forwarder matched, sending to recursors");
        recursor::recurse(
            self.table.recursors(),
            &request,
            transport,
            peer,
            self.timeout,
            sink,
        )
        .await;
    }
}

use super::failure::{respond_failure, FailureReason};
use super::sink::{send_message, ResponseSink};
use super::transport;
use hickory_proto::op::Message;
use splitdns_domain::TransportKind;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{debug, error, info};

/// Ordered failover across the configured recursors: one exchange per
/// recursor, first success wins, no retries and no health memory between
/// requests. The winning answer is relayed verbatim apart from asserting
/// recursion-available, since that is what we are to the client.
pub(crate) async fn recurse(
    recursors: &[SocketAddr],
    request: &Message,
    transport_kind: TransportKind,
    peer: SocketAddr,
    timeout: Duration,
    sink: &mut dyn ResponseSink,
) {
    let domain = request
        .queries()
        .first()
        .map(|q| q.name().to_utf8())
        .unwrap_or_default();

    for (position, server) in recursors.iter().enumerate() {
        match transport::exchange(transport_kind, *server, request, timeout).await {
            Ok(mut response) => {
                debug!(domain = %domain, server = %server, position, "recursor responded");
                response.set_recursion_available(true);
                send_message(sink, &response).await;
                return;
            }
            Err(e) => {
                info!(domain = %domain, server = %server, position, error = %e, "recursor failed, failing over");
            }
        }
    }

    error!(
        domain = %domain,
        client = %peer,
        transport = %transport_kind,
        attempts = recursors.len(),
        "all recursors failed"
    );
    respond_failure(sink, request, FailureReason::AllRecursorsFailed).await;
}

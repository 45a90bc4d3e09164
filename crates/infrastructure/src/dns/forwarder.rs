use super::failure::{respond_failure, FailureReason};
use super::sink::{send_message, ResponseSink};
use super::{transfer, transport};
use hickory_proto::op::Message;
use hickory_proto::rr::RecordType;
use splitdns_domain::{ForwardRule, TransportKind};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Relay `request` to the matched forwarder, mirroring the client's
/// transport. Always answers: either the upstream's reply (possibly
/// truncated to the rule's limit) or a failure response.
pub(crate) async fn forward(
    rule: &ForwardRule,
    request: &Message,
    transport_kind: TransportKind,
    timeout: Duration,
    sink: &mut dyn ResponseSink,
) {
    debug!(
        forwarder = %rule.name,
        server = %rule.address,
        transport = %transport_kind,
        "forwarding query"
    );

    if is_transfer(request) {
        if !transport_kind.is_stream() {
            warn!(
                forwarder = %rule.name,
                "zone transfer requested over a datagram transport, refusing"
            );
            respond_failure(sink, request, FailureReason::TransferOverDatagram).await;
            return;
        }
        if let Err(e) = transfer::proxy(rule.address, request, timeout, sink).await {
            error!(forwarder = %rule.name, server = %rule.address, error = %e, "transfer relay failed");
            respond_failure(sink, request, FailureReason::UpstreamExchange).await;
        }
        return;
    }

    let mut response =
        match transport::exchange(transport_kind, rule.address, request, timeout).await {
            Ok(response) => response,
            Err(e) => {
                error!(forwarder = %rule.name, server = %rule.address, error = %e, "forward exchange failed");
                respond_failure(sink, request, FailureReason::UpstreamExchange).await;
                return;
            }
        };

    if response.answers().is_empty() {
        // Still relayed to the client; worth noting, not an error.
        warn!(
            forwarder = %rule.name,
            domain = %query_name(request),
            "forwarder returned zero answer records"
        );
    }

    if rule.limit > 0 && response.answers().len() > rule.limit {
        debug!(
            forwarder = %rule.name,
            answers = response.answers().len(),
            limit = rule.limit,
            "truncating answer section"
        );
        let mut answers = response.take_answers();
        answers.truncate(rule.limit);
        response.insert_answers(answers);
    }

    send_message(sink, &response).await;
}

/// A request is a zone transfer if any question asks for a full (AXFR) or
/// incremental (IXFR) transfer.
pub(crate) fn is_transfer(request: &Message) -> bool {
    request
        .queries()
        .iter()
        .any(|q| matches!(q.query_type(), RecordType::AXFR | RecordType::IXFR))
}

fn query_name(request: &Message) -> String {
    request
        .queries()
        .first()
        .map(|q| q.name().to_utf8())
        .unwrap_or_default()
}

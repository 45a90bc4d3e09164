use super::sink::{send_message, ResponseSink};
use hickory_proto::op::{Message, MessageType, ResponseCode};
use tracing::debug;

/// Why a request could not be resolved. Each reason maps to a fixed,
/// protocol-valid reply; building that reply never fails, which makes this
/// the terminal step of every failure path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    EmptyQuestion,
    TransferOverDatagram,
    UpstreamExchange,
    AllRecursorsFailed,
}

impl FailureReason {
    fn response_code(self) -> ResponseCode {
        match self {
            FailureReason::EmptyQuestion | FailureReason::TransferOverDatagram => {
                ResponseCode::Refused
            }
            FailureReason::UpstreamExchange | FailureReason::AllRecursorsFailed => {
                ResponseCode::ServFail
            }
        }
    }
}

/// Build the failure reply for `request`: id and question echoed back,
/// status per reason. `AllRecursorsFailed` asserts recursion-available,
/// since from the client's point of view we are a recursion-capable
/// resolver that happens to be unable to answer right now.
pub fn failure_response(request: &Message, reason: FailureReason) -> Message {
    let mut response = Message::new();
    response
        .set_id(request.id())
        .set_message_type(MessageType::Response)
        .set_op_code(request.op_code())
        .set_recursion_desired(request.recursion_desired())
        .set_recursion_available(reason == FailureReason::AllRecursorsFailed)
        .set_response_code(reason.response_code());
    for query in request.queries() {
        response.add_query(query.clone());
    }
    response
}

pub(crate) async fn respond_failure(
    sink: &mut dyn ResponseSink,
    request: &Message,
    reason: FailureReason,
) {
    debug!(id = request.id(), reason = ?reason, "sending failure response");
    send_message(sink, &failure_response(request, reason)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_proto::op::Query;
    use hickory_proto::rr::{Name, RecordType};
    use std::str::FromStr;

    fn request() -> Message {
        let mut request = Message::new();
        request.set_id(0x4d2).set_message_type(MessageType::Query);
        request.set_recursion_desired(true);
        request.add_query(Query::query(
            Name::from_str("www.example.com.").unwrap(),
            RecordType::A,
        ));
        request
    }

    #[test]
    fn empty_question_and_transfer_refusals_use_refused() {
        for reason in [FailureReason::EmptyQuestion, FailureReason::TransferOverDatagram] {
            let response = failure_response(&request(), reason);
            assert_eq!(response.response_code(), ResponseCode::Refused);
            assert!(!response.recursion_available());
        }
    }

    #[test]
    fn upstream_errors_use_servfail() {
        let response = failure_response(&request(), FailureReason::UpstreamExchange);
        assert_eq!(response.response_code(), ResponseCode::ServFail);
        assert!(!response.recursion_available());
    }

    #[test]
    fn all_recursors_failed_is_servfail_with_recursion_available() {
        let response = failure_response(&request(), FailureReason::AllRecursorsFailed);
        assert_eq!(response.response_code(), ResponseCode::ServFail);
        assert!(response.recursion_available());
    }

    #[test]
    fn reply_is_correlated_to_the_request() {
        let request = request();
        let response = failure_response(&request, FailureReason::UpstreamExchange);
        assert_eq!(response.id(), request.id());
        assert_eq!(response.message_type(), MessageType::Response);
        assert_eq!(response.queries(), request.queries());
        assert!(response.recursion_desired());
        assert!(response.answers().is_empty());
    }
}

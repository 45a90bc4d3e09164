use async_trait::async_trait;
use hickory_proto::op::Message;
use splitdns_domain::EngineError;
use tracing::error;

/// The client-facing reply channel handed in by the listener. A datagram
/// sink sends one packet per call; a stream sink writes length-prefixed
/// frames. Zone-transfer proxying calls `send` once per envelope.
#[async_trait]
pub trait ResponseSink: Send {
    async fn send(&mut self, message: &[u8]) -> Result<(), EngineError>;
}

/// Serialize and send a single reply, logging instead of propagating when
/// the client is already gone. Every non-transfer path ends here.
pub(crate) async fn send_message(sink: &mut dyn ResponseSink, message: &Message) {
    let bytes = match message.to_vec() {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(id = message.id(), error = %e, "failed to encode response");
            return;
        }
    };
    if let Err(e) = sink.send(&bytes).await {
        error!(id = message.id(), error = %e, "failed to write response to client");
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Collects every frame the engine writes, for assertions.
    #[derive(Default)]
    pub(crate) struct BufferSink {
        pub frames: Vec<Vec<u8>>,
    }

    #[async_trait]
    impl ResponseSink for BufferSink {
        async fn send(&mut self, message: &[u8]) -> Result<(), EngineError> {
            self.frames.push(message.to_vec());
            Ok(())
        }
    }

    impl BufferSink {
        /// The single reply most tests expect, parsed.
        pub(crate) fn only_message(&self) -> Message {
            assert_eq!(self.frames.len(), 1, "expected exactly one reply frame");
            Message::from_vec(&self.frames[0]).expect("reply should parse")
        }
    }
}

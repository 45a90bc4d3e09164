/// How a query reached us, and therefore how we talk to upstreams for it:
/// a datagram-sourced query is relayed over UDP, a stream-sourced one over
/// TCP. Zone transfers are only legal on `Stream`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Datagram,
    Stream,
}

impl TransportKind {
    pub fn is_stream(self) -> bool {
        matches!(self, TransportKind::Stream)
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Datagram => write!(f, "udp"),
            TransportKind::Stream => write!(f, "tcp"),
        }
    }
}

//! The resolution engine. One [`QueryEngine::handle`] call per inbound
//! request; the engine decides between a configured forwarder and the
//! recursor list, performs the upstream exchange, and writes the reply
//! through the caller's [`ResponseSink`].

pub mod failure;
mod forwarder;
mod recursor;
pub mod router;
pub mod sink;
mod transfer;
pub mod transport;

pub use failure::{failure_response, FailureReason};
pub use router::QueryEngine;
pub use sink::ResponseSink;

use std::net::SocketAddr;
use thiserror::Error;

/// Errors produced while exchanging with an upstream or writing back to the
/// client. None of these are fatal to the process: the engine answers every
/// failure with a protocol-valid reply and moves on.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("timed out waiting for {server}")]
    ExchangeTimeout { server: SocketAddr },

    #[error("exchange with {server} failed: {detail}")]
    ExchangeIo { server: SocketAddr, detail: String },

    #[error("malformed message from {server}: {detail}")]
    BadUpstreamMessage { server: SocketAddr, detail: String },

    #[error("response id from {server} does not match the query")]
    ResponseIdMismatch { server: SocketAddr },

    #[error("failed to encode message: {0}")]
    Encode(String),

    #[error("client connection gone: {0}")]
    ClientGone(String),
}

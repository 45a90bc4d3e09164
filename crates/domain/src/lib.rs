//! Splitdns domain layer: configuration, the routing table, and the error
//! taxonomy shared by the engine. No I/O happens here.
pub mod config;
pub mod errors;
pub mod routing;
pub mod transport;

pub use config::{CliOverrides, Config, ConfigError};
pub use errors::EngineError;
pub use routing::{ForwardRule, RoutingTable};
pub use transport::TransportKind;

//! Splitdns infrastructure layer: the request dispatch and resolution
//! engine, plus the upstream transport primitives it exchanges over.
pub mod dns;

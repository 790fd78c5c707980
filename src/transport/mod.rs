//! HTTP transport to the remote API.

mod http;

pub use http::{HttpTransport, TransportError};

//! Transport layer for MCP communication.
//!
//! Every transport feeds the same [`ProtocolHandler`](crate::protocol::ProtocolHandler).
//! Persistent transports dispatch each inbound frame on its own task and
//! write responses in completion order.

pub mod framing;
#[cfg(feature = "http")]
pub mod http;
pub mod stdio;
pub mod stream;

#[cfg(feature = "http")]
pub use http::HttpTransport;
pub use stdio::StdioTransport;
pub use stream::serve_lines;

//! MCP protocol handling: JSON-RPC validation and dispatch.

pub mod handler;
pub mod negotiation;
pub mod validator;

pub use handler::ProtocolHandler;
pub use negotiation::{negotiate, NegotiatedSession};

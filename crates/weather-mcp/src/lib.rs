//! weather-mcp: MCP server and client exposing weather tools over JSON-RPC 2.0.

pub mod client;
pub mod completion;
pub mod config;
pub mod prompts;
pub mod protocol;
pub mod repl;
pub mod resources;
pub mod tools;
pub mod transport;
pub mod types;

pub use client::{ConnectionState, McpClient, SessionStateMachine};
pub use config::{ConfigOverrides, ServerConfig};
pub use protocol::ProtocolHandler;
pub use tools::ToolRegistry;
pub use transport::StdioTransport;

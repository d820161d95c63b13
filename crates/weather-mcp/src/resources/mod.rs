//! MCP resource implementations.

pub mod registry;
pub mod weather;

pub use registry::ResourceRegistry;

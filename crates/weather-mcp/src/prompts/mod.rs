//! MCP prompt templates.

pub mod analysis;
pub mod outfit;
pub mod registry;

pub use registry::PromptRegistry;

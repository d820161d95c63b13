//! Stdio transport. Reads JSON-RPC from stdin, writes to stdout.

use crate::protocol::ProtocolHandler;
use crate::types::McpResult;

use super::stream::serve_lines;

/// Stdio transport for desktop MCP clients.
pub struct StdioTransport {
    handler: ProtocolHandler,
}

impl StdioTransport {
    pub fn new(handler: ProtocolHandler) -> Self {
        Self { handler }
    }

    /// Run until stdin closes. Logging must stay on stderr.
    pub async fn run(&self) -> McpResult<()> {
        tracing::info!("Stdio transport started");
        serve_lines(
            self.handler.clone(),
            tokio::io::stdin(),
            tokio::io::stdout(),
        )
        .await?;
        tracing::info!("Stdio transport stopped");
        Ok(())
    }
}

//! Newline-delimited JSON over any byte stream.
//!
//! Each line is dispatched on its own task; a single writer task serializes
//! responses onto the output as they complete.

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::protocol::ProtocolHandler;
use crate::types::{McpError, McpResult, RequestId};

use super::framing;

/// Serve `reader` until EOF, writing responses to `writer`. Returns once
/// every in-flight request has been answered.
pub async fn serve_lines<R, W>(handler: ProtocolHandler, reader: R, mut writer: W) -> McpResult<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Value>();

    let writer_task = tokio::spawn(async move {
        while let Some(response) = rx.recv().await {
            let framed = framing::frame_message(&response)?;
            writer.write_all(framed.as_bytes()).await?;
            writer.flush().await?;
        }
        Ok::<_, McpError>(())
    });

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            tracing::info!("EOF on input, draining in-flight requests");
            break;
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Non UTF-8 input line: {e}");
                let _ = tx.send(
                    McpError::ParseError(format!("invalid UTF-8: {e}"))
                        .to_response_value(RequestId::Null),
                );
                continue;
            }
        };
        let Some(payload) = framing::payload_of(line) else {
            continue;
        };

        let payload = payload.to_string();
        let handler = handler.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Some(response) = handler.handle_raw(&payload).await {
                if tx.send(response).is_err() {
                    tracing::debug!("Output closed before response could be written");
                }
            }
        });
    }

    // The writer finishes once every task has dropped its sender.
    drop(tx);
    writer_task
        .await
        .map_err(|e| McpError::Transport(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ToolContext, ToolRegistry, DEFAULT_TOOL_TIMEOUT};
    use std::sync::Arc;
    use tokio::io::AsyncReadExt;
    use weather_core::{MockWeatherProvider, RuleBasedInsights};

    fn handler() -> ProtocolHandler {
        let ctx = ToolContext {
            provider: Arc::new(MockWeatherProvider::new()),
            insights: Arc::new(RuleBasedInsights::new()),
        };
        ProtocolHandler::new(ToolRegistry::weather(ctx, DEFAULT_TOOL_TIMEOUT).unwrap())
    }

    async fn run(input: &str) -> Vec<Value> {
        let (out_writer, mut out_reader) = tokio::io::duplex(64 * 1024);
        serve_lines(handler(), input.as_bytes(), out_writer)
            .await
            .unwrap();
        let mut output = String::new();
        out_reader.read_to_string(&mut output).await.unwrap();
        output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_answers_requests_skips_notifications() {
        let input = concat!(
            "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"tools/list\"}\n",
            "\n",
            "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n",
            "{\"jsonrpc\":\"2.0\",\"id\":\"two\",\"method\":\"prompts/list\"}\n",
        );
        let responses = run(input).await;
        assert_eq!(responses.len(), 2);
        let mut ids: Vec<String> = responses.iter().map(|r| r["id"].to_string()).collect();
        ids.sort();
        assert_eq!(ids, vec!["\"two\"".to_string(), "1".to_string()]);
    }

    #[tokio::test]
    async fn test_garbage_line_gets_parse_error() {
        let responses = run("not json at all\n").await;
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["error"]["code"], -32700);
        assert!(responses[0]["id"].is_null());
    }

    #[tokio::test]
    async fn test_last_line_without_newline() {
        let responses = run("{\"id\":0,\"method\":\"resources/list\"}").await;
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["id"], 0);
    }
}

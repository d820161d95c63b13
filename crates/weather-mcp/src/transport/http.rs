//! HTTP transport: one-shot POST /mcp, persistent WebSocket /mcp/ws, and /health.

use axum::{
    body::Bytes,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Json as AxumJson, Response},
    routing::{get, post},
    Router,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;

use crate::protocol::ProtocolHandler;
use crate::types::{HealthReport, McpError, McpResult, RequestId};

/// HTTP + WebSocket transport for web-based MCP clients.
pub struct HttpTransport {
    handler: ProtocolHandler,
}

impl HttpTransport {
    pub fn new(handler: ProtocolHandler) -> Self {
        Self { handler }
    }

    /// Run the HTTP server on the given address.
    pub async fn run(&self, addr: &str) -> McpResult<()> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(McpError::Io)?;

        tracing::info!("HTTP transport listening on {addr}");
        tracing::info!("  Health check:  http://{addr}/health");
        tracing::info!("  MCP HTTP:      http://{addr}/mcp");
        tracing::info!("  MCP WebSocket: ws://{addr}/mcp/ws");

        self.serve(listener).await
    }

    /// Serve on an already-bound listener.
    pub async fn serve(&self, listener: tokio::net::TcpListener) -> McpResult<()> {
        axum::serve(listener, router(self.handler.clone()))
            .await
            .map_err(|e| McpError::Transport(e.to_string()))
    }
}

pub fn router(handler: ProtocolHandler) -> Router {
    Router::new()
        .route("/mcp", post(handle_request))
        .route("/mcp/ws", get(handle_websocket))
        .route("/health", get(handle_health))
        .layer(CorsLayer::permissive())
        .with_state(handler)
}

/// One envelope in, one envelope out. Protocol errors still answer 200;
/// notifications answer 202 with an empty body.
async fn handle_request(State(handler): State<ProtocolHandler>, body: Bytes) -> Response {
    let response = match std::str::from_utf8(&body) {
        Ok(payload) => handler.handle_raw(payload).await,
        Err(e) => Some(
            McpError::ParseError(format!("invalid UTF-8: {e}")).to_response_value(RequestId::Null),
        ),
    };

    match response {
        Some(value) => (StatusCode::OK, AxumJson(value)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

async fn handle_websocket(
    State(handler): State<ProtocolHandler>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| serve_socket(handler, socket))
}

async fn serve_socket(handler: ProtocolHandler, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let writer = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    tracing::debug!("WebSocket client connected");

    while let Some(frame) = stream.next().await {
        let payload = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(e) => {
                    let err = McpError::ParseError(format!("invalid UTF-8: {e}"))
                        .to_response_value(RequestId::Null);
                    let _ = tx.send(err.to_string());
                    continue;
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!("WebSocket error: {e}");
                break;
            }
        };

        let handler = handler.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Some(response) = handler.handle_raw(&payload).await {
                let _ = tx.send(response.to_string());
            }
        });
    }

    drop(tx);
    let _ = writer.await;
    tracing::debug!("WebSocket client disconnected");
}

async fn handle_health() -> AxumJson<HealthReport> {
    AxumJson(HealthReport::snapshot())
}

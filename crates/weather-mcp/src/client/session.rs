//! The MCP client: persistent channel when available, one-shot otherwise.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::types::*;

use super::channel::{OneShotChannel, PersistentChannel, PersistentConnector};
use super::state::{ConnectionState, SessionStateMachine, Subscription};

/// An MCP client session, constructed and owned by the caller.
///
/// The persistent channel is attempted once by [`connect`](Self::connect)
/// and again only on [`reconnect`](Self::reconnect). Whenever it is not
/// established, calls go over the one-shot channel.
pub struct McpClient {
    state: SessionStateMachine,
    one_shot: Arc<dyn OneShotChannel>,
    connector: Option<Arc<dyn PersistentConnector>>,
    persistent: Mutex<Option<Arc<PersistentChannel>>>,
    next_id: AtomicI64,
}

impl std::fmt::Debug for McpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpClient")
            .field("state", &self.state.state())
            .field("persistent", &self.connector.is_some())
            .finish()
    }
}

impl McpClient {
    pub fn new(
        one_shot: Arc<dyn OneShotChannel>,
        connector: Option<Arc<dyn PersistentConnector>>,
    ) -> Self {
        Self {
            state: SessionStateMachine::new(),
            one_shot,
            connector,
            persistent: Mutex::new(None),
            next_id: AtomicI64::new(1),
        }
    }

    /// Client for a server root such as `http://localhost:8000`: one-shot
    /// over `POST /mcp`, persistent over `ws://…/mcp/ws`.
    #[cfg(feature = "http")]
    pub fn for_server(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            base.to_string()
        };

        Self::new(
            Arc::new(super::http::HttpOneShot::new(format!("{base}/mcp"))),
            Some(Arc::new(super::ws::WebSocketConnector::new(format!(
                "{ws_base}/mcp/ws"
            )))),
        )
    }

    pub fn state(&self) -> ConnectionState {
        self.state.state()
    }

    pub fn state_machine(&self) -> &SessionStateMachine {
        &self.state
    }

    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(ConnectionState, ConnectionState) + Send + Sync + 'static,
    {
        self.state.subscribe(observer)
    }

    fn slot(&self) -> MutexGuard<'_, Option<Arc<PersistentChannel>>> {
        self.persistent.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn active_channel(&self) -> Option<Arc<PersistentChannel>> {
        self.slot().as_ref().filter(|c| c.is_open()).cloned()
    }

    /// Attempt the persistent channel once. Failure is not an error for the
    /// caller: the state becomes `Error` and calls use the one-shot path.
    pub async fn connect(&self) -> ConnectionState {
        let Some(connector) = self.connector.clone() else {
            tracing::debug!("No persistent connector configured; using one-shot only");
            return self.state();
        };
        if !self.state.begin_connect() {
            return self.state();
        }

        match connector.connect().await {
            Ok(link) => {
                // Connected before the reader starts, so an immediate close
                // still moves the state on to Disconnected.
                self.state.connected();
                let machine = self.state.clone();
                let channel = PersistentChannel::open(link, move || {
                    machine.closed();
                });
                *self.slot() = Some(Arc::new(channel));
            }
            Err(e) => {
                tracing::warn!("Persistent channel unavailable, falling back to one-shot: {e}");
                self.state.failed();
            }
        }
        self.state()
    }

    /// Drop any current persistent channel and attempt a new one.
    pub async fn reconnect(&self) -> ConnectionState {
        let previous = self.slot().take();
        if previous.is_some() {
            drop(previous);
            self.state.closed();
        }
        self.connect().await
    }

    fn next_request_id(&self) -> RequestId {
        RequestId::from(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Send a request and return its `result`. Error envelopes become
    /// [`McpError::Remote`].
    pub async fn request(&self, method: &str, params: Option<Value>) -> McpResult<Value> {
        let id = self.next_request_id();
        let payload = serde_json::to_string(&JsonRpcRequest::new(id.clone(), method, params))?;

        let response = match self.active_channel() {
            Some(channel) => match channel.request(id, payload.clone()).await {
                Ok(v) => v,
                Err(McpError::ConnectionClosed) => {
                    tracing::warn!("Persistent channel closed during {method}; retrying one-shot");
                    self.one_shot_request(payload).await?
                }
                Err(e) => return Err(e),
            },
            None => self.one_shot_request(payload).await?,
        };

        decode_response(response)
    }

    async fn one_shot_request(&self, payload: String) -> McpResult<Value> {
        match self.one_shot.exchange(payload).await? {
            Some(text) => Ok(serde_json::from_str(&text)?),
            None => Err(McpError::Transport(
                "server returned no response for a request".to_string(),
            )),
        }
    }

    pub async fn notify(&self, method: &str, params: Option<Value>) -> McpResult<()> {
        let payload = serde_json::to_string(&JsonRpcNotification::new(method.to_string(), params))?;
        if let Some(channel) = self.active_channel() {
            if channel.send(payload.clone()).is_ok() {
                return Ok(());
            }
        }
        self.one_shot.exchange(payload).await?;
        Ok(())
    }

    async fn typed<T: DeserializeOwned>(&self, method: &str, params: Option<Value>) -> McpResult<T> {
        let result = self.request(method, params).await?;
        Ok(serde_json::from_value(result)?)
    }

    pub async fn initialize(&self, client_info: Implementation) -> McpResult<InitializeResult> {
        let result: InitializeResult = self
            .typed(
                "initialize",
                Some(json!({
                    "protocolVersion": MCP_VERSION,
                    "capabilities": {},
                    "clientInfo": client_info,
                })),
            )
            .await?;
        self.notify("notifications/initialized", None).await?;
        Ok(result)
    }

    pub async fn list_tools(&self) -> McpResult<Vec<ToolDefinition>> {
        let result: ToolListResult = self.typed("tools/list", None).await?;
        Ok(result.tools)
    }

    pub async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<ToolCallResult> {
        self.typed(
            "tools/call",
            Some(json!({"name": name, "arguments": arguments})),
        )
        .await
    }

    pub async fn list_resources(&self) -> McpResult<Vec<ResourceDefinition>> {
        let result: ResourceListResult = self.typed("resources/list", None).await?;
        Ok(result.resources)
    }

    pub async fn read_resource(&self, uri: &str) -> McpResult<ReadResourceResult> {
        self.typed("resources/read", Some(json!({"uri": uri}))).await
    }

    pub async fn list_prompts(&self) -> McpResult<Vec<PromptDefinition>> {
        let result: PromptListResult = self.typed("prompts/list", None).await?;
        Ok(result.prompts)
    }

    pub async fn get_prompt(&self, name: &str, arguments: Value) -> McpResult<PromptGetResult> {
        self.typed(
            "prompts/get",
            Some(json!({"name": name, "arguments": arguments})),
        )
        .await
    }

    pub async fn complete(&self, argument: &str, value: &str) -> McpResult<Completion> {
        let result: CompleteResult = self
            .typed(
                "completion/complete",
                Some(json!({"argument": {"name": argument, "value": value}})),
            )
            .await?;
        Ok(result.completion)
    }
}

fn decode_response(mut response: Value) -> McpResult<Value> {
    if let Some(error) = response.get_mut("error").map(Value::take) {
        let error: JsonRpcErrorObject = serde_json::from_value(error)?;
        return Err(error.into());
    }
    response
        .get_mut("result")
        .map(Value::take)
        .ok_or_else(|| McpError::Transport("response carries neither result nor error".to_string()))
}

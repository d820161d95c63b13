//! Edge case integration tests for weather-mcp.
//!
//! Covers envelope validation, id echoing, notifications, the two fault
//! layers, out-of-order completion and client fallback.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use weather_core::{MockWeatherProvider, RuleBasedInsights, WeatherError, WeatherProvider};
use weather_core::{Units, WeatherReport, WeatherResult};
use weather_mcp::client::{
    ConnectionState, DuplexLink, McpClient, OneShotChannel, PersistentChannel, PersistentConnector,
};
use weather_mcp::protocol::ProtocolHandler;
use weather_mcp::tools::{ToolContext, ToolHandler, ToolRegistry, DEFAULT_TOOL_TIMEOUT};
use weather_mcp::transport::serve_lines;
use weather_mcp::types::*;

// ─────────────────────── helpers ───────────────────────

fn weather_handler() -> ProtocolHandler {
    let ctx = ToolContext {
        provider: Arc::new(MockWeatherProvider::new()),
        insights: Arc::new(RuleBasedInsights::new()),
    };
    ProtocolHandler::new(ToolRegistry::weather(ctx, DEFAULT_TOOL_TIMEOUT).unwrap())
}

/// Build an MCP JSON-RPC request.
fn mcp_request(id: Value, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params
    })
}

fn tool_call(id: i64, name: &str, arguments: Value) -> Value {
    mcp_request(
        json!(id),
        "tools/call",
        json!({"name": name, "arguments": arguments}),
    )
}

/// Send a JSON-RPC message through the handler and return the response.
async fn send(handler: &ProtocolHandler, msg: Value) -> Option<Value> {
    handler.handle_value(msg).await
}

/// Send and unwrap the response.
async fn send_unwrap(handler: &ProtocolHandler, msg: Value) -> Value {
    send(handler, msg).await.expect("expected response")
}

fn error_code(response: &Value) -> i64 {
    response["error"]["code"].as_i64().expect("error envelope")
}

/// Provider whose upstream is always down.
struct Unreachable;

#[async_trait]
impl WeatherProvider for Unreachable {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn current(&self, _location: &str, _units: Units) -> WeatherResult<WeatherReport> {
        Err(WeatherError::Provider("upstream quota exceeded".to_string()))
    }
}

/// Tool that takes `ms` milliseconds before answering.
struct Slow;

#[async_trait]
impl ToolHandler for Slow {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "slow".to_string(),
            description: "Answers after a delay".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {"ms": {"type": "integer", "minimum": 0}},
                "required": ["ms"]
            }),
        }
    }

    async fn execute(&self, args: Value) -> McpResult<ToolOutcome> {
        let ms = args["ms"].as_u64().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(ToolOutcome::text(format!("slept {ms}ms")))
    }
}

/// One-shot channel that dispatches straight into a handler.
struct InProcess(ProtocolHandler);

#[async_trait]
impl OneShotChannel for InProcess {
    async fn exchange(&self, payload: String) -> McpResult<Option<String>> {
        Ok(self.0.handle_raw(&payload).await.map(|v| v.to_string()))
    }
}

struct Refused;

#[async_trait]
impl PersistentConnector for Refused {
    async fn connect(&self) -> McpResult<DuplexLink> {
        Err(McpError::Transport("connection refused".to_string()))
    }
}

// ─────────────────────── envelope validation ───────────────────────

#[tokio::test]
async fn test_unparseable_payloads_are_parse_errors_with_null_id() {
    let handler = weather_handler();
    for payload in ["{", "not json", "{\"jsonrpc\": \"2.0\", \"id\": 1,", "\u{0}"] {
        let response = handler.handle_raw(payload).await.expect("response");
        assert_eq!(error_code(&response), -32700, "payload {payload:?}");
        assert!(response["id"].is_null());
    }
}

#[tokio::test]
async fn test_missing_method_is_invalid_request() {
    let handler = weather_handler();
    let response = send_unwrap(&handler, json!({"jsonrpc": "2.0", "id": 4})).await;
    assert_eq!(error_code(&response), -32600);
    assert_eq!(response["id"], 4);

    // Missing method without an id still gets an answer.
    let response = send_unwrap(&handler, json!({"jsonrpc": "2.0"})).await;
    assert_eq!(error_code(&response), -32600);
}

#[tokio::test]
async fn test_non_object_envelopes_are_invalid_request() {
    let handler = weather_handler();
    for value in [json!([]), json!(42), json!("tools/list"), json!(null)] {
        let response = send_unwrap(&handler, value.clone()).await;
        assert_eq!(error_code(&response), -32600, "envelope {value}");
    }
}

#[tokio::test]
async fn test_unknown_method_names_the_method() {
    let handler = weather_handler();
    let response = send_unwrap(&handler, mcp_request(json!(1), "weather/teleport", json!({}))).await;
    assert_eq!(error_code(&response), -32601);
    assert!(response["error"]["message"]
        .as_str()
        .unwrap()
        .contains("weather/teleport"));
}

// ─────────────────────── correlation ids ───────────────────────

#[tokio::test]
async fn test_ids_echo_exactly() {
    let handler = weather_handler();
    for id in [json!(0), json!(-7), json!(9_007_199_254_740_991i64), json!("abc"), json!(""), json!("1")] {
        let response = send_unwrap(&handler, mcp_request(id.clone(), "tools/list", json!({}))).await;
        assert_eq!(response["id"], id);
        assert_eq!(response["jsonrpc"], "2.0");
    }
}

#[tokio::test]
async fn test_string_id_is_not_coerced_to_number() {
    let handler = weather_handler();
    let response = send_unwrap(&handler, mcp_request(json!("7"), "tools/list", json!({}))).await;
    assert!(response["id"].is_string());
}

// ─────────────────────── notifications ───────────────────────

#[tokio::test]
async fn test_notifications_never_answered() {
    let handler = weather_handler();

    let no_id = json!({"jsonrpc": "2.0", "method": "tools/list"});
    assert!(send(&handler, no_id).await.is_none());

    let null_id = json!({"jsonrpc": "2.0", "id": null, "method": "tools/list"});
    assert!(send(&handler, null_id).await.is_none());

    let initialized = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
    assert!(send(&handler, initialized).await.is_none());

    let cancelled = json!({
        "jsonrpc": "2.0",
        "method": "notifications/cancelled",
        "params": {"requestId": 3, "reason": "user"}
    });
    assert!(send(&handler, cancelled).await.is_none());
}

#[tokio::test]
async fn test_failing_notification_stays_silent() {
    let handler = weather_handler();
    let msg = json!({
        "jsonrpc": "2.0",
        "method": "tools/call",
        "params": {"name": "no_such_tool"}
    });
    assert!(send(&handler, msg).await.is_none());
}

// ─────────────────────── tools ───────────────────────

#[tokio::test]
async fn test_tools_list_has_four_complete_entries() {
    let handler = weather_handler();
    let first = send_unwrap(&handler, json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"})).await;
    let tools = first["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 4);
    for tool in tools {
        assert!(!tool["name"].as_str().unwrap().is_empty());
        assert!(!tool["description"].as_str().unwrap().is_empty());
        assert!(tool["inputSchema"].is_object());
    }

    let second = send_unwrap(&handler, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;
    assert_eq!(first["result"], second["result"]);
}

#[tokio::test]
async fn test_missing_required_argument_is_invalid_params() {
    let handler = weather_handler();
    let response = send_unwrap(&handler, tool_call(1, "get_weather", json!({}))).await;
    assert_eq!(error_code(&response), -32602);
    assert!(response.get("result").is_none());
}

#[tokio::test]
async fn test_unknown_tool_is_invalid_params() {
    let handler = weather_handler();
    let response = send_unwrap(&handler, tool_call(1, "get_tides", json!({}))).await;
    assert_eq!(error_code(&response), -32602);
}

#[tokio::test]
async fn test_forecast_days_out_of_range_is_invalid_params() {
    let handler = weather_handler();
    for days in [0, 8, 10, -1] {
        let response = send_unwrap(
            &handler,
            tool_call(5, "get_forecast", json!({"location": "Paris", "days": days})),
        )
        .await;
        assert_eq!(error_code(&response), -32602, "days = {days}");
    }

    let response = send_unwrap(
        &handler,
        tool_call(6, "get_forecast", json!({"location": "Paris", "days": 7})),
    )
    .await;
    assert_eq!(response["result"]["isError"], false);
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("Day 7"));
}

#[tokio::test]
async fn test_blank_location_is_domain_fault() {
    let handler = weather_handler();
    let response = send_unwrap(&handler, tool_call(1, "get_weather", json!({"location": "   "}))).await;
    assert!(response.get("error").is_none());
    assert_eq!(response["result"]["isError"], true);
    assert!(response["result"]["content"][0]["text"]
        .as_str()
        .unwrap()
        .starts_with("Error executing tool 'get_weather'"));
}

#[tokio::test]
async fn test_provider_failure_is_domain_fault() {
    let ctx = ToolContext {
        provider: Arc::new(Unreachable),
        insights: Arc::new(RuleBasedInsights::new()),
    };
    let handler = ProtocolHandler::new(ToolRegistry::weather(ctx, DEFAULT_TOOL_TIMEOUT).unwrap());

    for name in ["get_weather", "get_forecast", "get_weather_insights", "get_weather_summary_advisory"] {
        let response = send_unwrap(&handler, tool_call(1, name, json!({"location": "Oslo"}))).await;
        assert_eq!(response["result"]["isError"], true, "tool {name}");
        assert!(response["result"]["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("quota"));
    }
}

#[tokio::test]
async fn test_tool_success_and_extra_arguments_ignored() {
    let handler = weather_handler();
    let response = send_unwrap(
        &handler,
        tool_call(1, "get_weather", json!({"location": "London", "units": "imperial", "verbose": true})),
    )
    .await;
    assert_eq!(response["result"]["isError"], false);
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("Weather in London"));
    assert!(text.contains("°F"));
}

#[tokio::test(start_paused = true)]
async fn test_tool_timeout_is_domain_fault() {
    let registry = ToolRegistry::builder()
        .register(Slow)
        .timeout(Duration::from_secs(1))
        .build()
        .unwrap();
    let handler = ProtocolHandler::new(registry);

    let response = send_unwrap(&handler, tool_call(1, "slow", json!({"ms": 5_000}))).await;
    assert_eq!(response["result"]["isError"], true);
    assert!(response["result"]["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("timed out"));
}

// ─────────────────────── resources, prompts, completion ───────────────────────

#[tokio::test]
async fn test_resources_and_prompts_round_trip() {
    let handler = weather_handler();

    let list = send_unwrap(&handler, json!({"jsonrpc": "2.0", "id": 1, "method": "resources/list"})).await;
    let resources = list["result"]["resources"].as_array().unwrap();
    assert_eq!(resources.len(), 2);

    let read = send_unwrap(
        &handler,
        mcp_request(json!(2), "resources/read", json!({"uri": "weather://forecast"})),
    )
    .await;
    assert_eq!(read["result"]["contents"][0]["uri"], "weather://forecast");

    let missing = send_unwrap(
        &handler,
        mcp_request(json!(3), "resources/read", json!({"uri": "weather://radar"})),
    )
    .await;
    assert_eq!(error_code(&missing), -32602);

    let prompt = send_unwrap(
        &handler,
        mcp_request(
            json!(4),
            "prompts/get",
            json!({"name": "weather_analysis", "arguments": {"location": "Tokyo", "activity": "cycling"}}),
        ),
    )
    .await;
    let text = prompt["result"]["messages"][0]["content"]["text"].as_str().unwrap();
    assert!(text.contains("Tokyo"));
    assert!(text.contains("cycling"));

    let unknown = send_unwrap(
        &handler,
        mcp_request(json!(5), "prompts/get", json!({"name": "haiku"})),
    )
    .await;
    assert_eq!(error_code(&unknown), -32602);
}

#[tokio::test]
async fn test_completion_filters_case_insensitively() {
    let handler = weather_handler();
    let response = send_unwrap(
        &handler,
        mcp_request(
            json!(1),
            "completion/complete",
            json!({"argument": {"name": "location", "value": "lo"}}),
        ),
    )
    .await;
    assert_eq!(response["result"]["completion"]["values"], json!(["London"]));

    let response = send_unwrap(
        &handler,
        mcp_request(
            json!(2),
            "completion/complete",
            json!({"argument": {"name": "tool", "value": "GET_W"}}),
        ),
    )
    .await;
    assert_eq!(response["result"]["completion"]["total"], 3);
}

// ─────────────────────── negotiation ───────────────────────

#[tokio::test]
async fn test_initialize_is_idempotent_and_advisory() {
    let handler = weather_handler();

    // Other methods work before any initialize.
    let response = send_unwrap(&handler, tool_call(1, "get_weather", json!({"location": "Paris"}))).await;
    assert_eq!(response["result"]["isError"], false);

    let init = mcp_request(
        json!(2),
        "initialize",
        json!({"protocolVersion": "2024-11-05", "capabilities": {}, "clientInfo": {"name": "t", "version": "1"}}),
    );
    let a = send_unwrap(&handler, init.clone()).await;
    let b = send_unwrap(&handler, init).await;
    assert_eq!(a["result"], b["result"]);
    assert_eq!(a["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(a["result"]["serverInfo"]["name"], SERVER_NAME);
    assert_eq!(a["result"]["capabilities"]["tools"], true);
}

// ─────────────────────── concurrency ───────────────────────

#[tokio::test]
async fn test_stream_answers_in_completion_order() {
    let registry = ToolRegistry::builder().register(Slow).build().unwrap();
    let handler = ProtocolHandler::new(registry);

    let (client, server) = tokio::io::duplex(4096);
    let (server_read, server_write) = tokio::io::split(server);
    let serving = tokio::spawn(serve_lines(handler, server_read, server_write));

    let (client_read, mut client_write) = tokio::io::split(client);
    let slow = tool_call(1, "slow", json!({"ms": 200}));
    let fast = mcp_request(
        json!(2),
        "initialize",
        json!({"protocolVersion": "2024-11-05", "capabilities": {}}),
    );
    client_write
        .write_all(format!("{slow}\n{fast}\n").as_bytes())
        .await
        .unwrap();

    let mut lines = BufReader::new(client_read).lines();
    let first: Value = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
    let second: Value = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();

    assert_eq!(first["id"], 2);
    assert!(first["result"]["protocolVersion"].is_string());
    assert_eq!(second["id"], 1);
    assert_eq!(second["result"]["content"][0]["text"], "slept 200ms");

    client_write.shutdown().await.unwrap();
    drop(client_write);
    serving.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_persistent_channel_correlates_reordered_initialize() {
    let handler = weather_handler();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
    let (in_tx, in_rx) = mpsc::unbounded_channel::<String>();

    // Peer answers the two requests in reverse arrival order.
    tokio::spawn(async move {
        let mut answers = Vec::new();
        while answers.len() < 2 {
            let Some(frame) = out_rx.recv().await else { return };
            if let Some(response) = handler.handle_raw(&frame).await {
                answers.push(response.to_string());
            }
        }
        for answer in answers.into_iter().rev() {
            let _ = in_tx.send(answer);
        }
    });

    let channel = Arc::new(PersistentChannel::open(
        DuplexLink {
            outbound: out_tx,
            inbound: in_rx,
        },
        || {},
    ));

    let init = |id: i64| {
        mcp_request(
            json!(id),
            "initialize",
            json!({"protocolVersion": "2024-11-05", "capabilities": {}, "clientInfo": {"name": format!("c{id}"), "version": "1"}}),
        )
        .to_string()
    };

    let (a, b) = tokio::join!(
        channel.request(RequestId::from(1), init(1)),
        channel.request(RequestId::from(2), init(2)),
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a["id"], 1);
    assert_eq!(b["id"], 2);
    assert!(a["result"]["serverInfo"].is_object());
    assert_eq!(channel.pending_count(), 0);
}

// ─────────────────────── client fallback ───────────────────────

#[tokio::test]
async fn test_refused_persistent_channel_falls_back_to_one_shot() {
    let client = McpClient::new(
        Arc::new(InProcess(weather_handler())),
        Some(Arc::new(Refused)),
    );

    let transitions = Arc::new(Mutex::new(Vec::new()));
    let record = transitions.clone();
    let _subscription = client.subscribe(move |prev, cur| {
        record.lock().unwrap().push((prev, cur));
    });

    assert_eq!(client.connect().await, ConnectionState::Error);
    assert_eq!(
        *transitions.lock().unwrap(),
        vec![
            (ConnectionState::Disconnected, ConnectionState::Connecting),
            (ConnectionState::Connecting, ConnectionState::Error),
        ]
    );

    let result = client
        .call_tool("get_weather", json!({"location": "Sydney"}))
        .await
        .unwrap();
    assert!(!result.is_error);
    assert!(result.joined_text().contains("Weather in Sydney"));

    let err = client.call_tool("get_weather", json!({})).await.unwrap_err();
    assert_eq!(err.code(), -32602);

    // No silent retry of the persistent channel.
    assert_eq!(client.state(), ConnectionState::Error);
}

#[tokio::test]
async fn test_unsubscribed_observer_is_not_called() {
    let client = McpClient::new(
        Arc::new(InProcess(weather_handler())),
        Some(Arc::new(Refused)),
    );
    let calls = Arc::new(Mutex::new(0usize));
    let counter = calls.clone();
    let subscription = client.subscribe(move |_, _| {
        *counter.lock().unwrap() += 1;
    });
    subscription.unsubscribe();

    client.connect().await;
    assert_eq!(*calls.lock().unwrap(), 0);
    assert_eq!(client.state_machine().observer_count(), 0);
}

#[tokio::test]
async fn test_client_surfaces_remote_protocol_errors() {
    let client = McpClient::new(Arc::new(InProcess(weather_handler())), None);
    let err = client.request("weather/teleport", None).await.unwrap_err();
    assert!(matches!(err, McpError::Remote { code: -32601, .. }));

    let init = client
        .initialize(Implementation::new("edge-cases", "1.0"))
        .await
        .unwrap();
    assert_eq!(init.protocol_version, MCP_VERSION);
    assert_eq!(client.list_tools().await.unwrap().len(), 4);
}

// ─────────────────────── http + websocket ───────────────────────

#[cfg(feature = "http")]
mod http {
    use super::*;
    use weather_mcp::transport::HttpTransport;

    async fn spawn_server() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let transport = HttpTransport::new(weather_handler());
        tokio::spawn(async move { transport.serve(listener).await });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_post_answers_and_accepts_notifications() {
        let base = spawn_server().await;
        let http = reqwest::Client::new();

        let response = http
            .post(format!("{base}/mcp"))
            .body(json!({"jsonrpc": "2.0", "id": "a", "method": "tools/list"}).to_string())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["id"], "a");
        assert_eq!(body["result"]["tools"].as_array().unwrap().len(), 4);

        let response = http
            .post(format!("{base}/mcp"))
            .body(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 202);
        assert!(response.text().await.unwrap().is_empty());

        let response = http
            .post(format!("{base}/mcp"))
            .body("{broken")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"]["code"], -32700);
        assert!(body["id"].is_null());
    }

    #[tokio::test]
    async fn test_health_snapshot() {
        let base = spawn_server().await;
        let body: Value = reqwest::get(format!("{base}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["compliant"], true);
        assert_eq!(body["methods"].as_array().unwrap().len(), METHOD_CATALOG.len());
        assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_client_uses_websocket_when_available() {
        let base = spawn_server().await;
        let client = McpClient::for_server(&base);
        assert_eq!(client.connect().await, ConnectionState::Connected);

        let (a, b) = tokio::join!(
            client.call_tool("get_forecast", json!({"location": "Paris", "days": 2})),
            client.call_tool("get_weather", json!({"location": "Tokyo"})),
        );
        assert!(a.unwrap().joined_text().contains("Weather forecast for Paris"));
        assert!(b.unwrap().joined_text().contains("Weather in Tokyo"));
    }

    #[tokio::test]
    async fn test_client_without_server_reports_error_state() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = McpClient::for_server(&format!("http://{addr}"));
        assert_eq!(client.connect().await, ConnectionState::Error);
        let err = client.list_tools().await.unwrap_err();
        assert!(matches!(err, McpError::Transport(_)));
    }
}

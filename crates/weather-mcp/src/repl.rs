//! Interactive REPL client for a running weather MCP server.
//!
//! Launch with `weather-mcp repl --url http://localhost:8000`.
//! Type `/help` for available commands, Tab for completion.

use rustyline::completion::{Completer, Pair};
use rustyline::config::CompletionType;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, ConditionalEventHandler, Config, Editor, Event, EventContext, EventHandler, Helper,
    KeyEvent, RepeatCount,
};
use serde_json::{json, Value};
use tokio::runtime::Handle;

use weather_core::MockWeatherProvider;

use crate::client::{ConnectionState, McpClient};
use crate::types::{Implementation, McpResult, ToolCallResult, SERVER_VERSION};

/// Available REPL commands.
const COMMANDS: &[(&str, &str)] = &[
    ("/weather", "Current weather: /weather <location> [metric|imperial]"),
    ("/forecast", "Forecast: /forecast <location> [days]"),
    ("/insights", "Insights: /insights <location> [activity]"),
    ("/advisory", "Summary and travel advisory: /advisory <location>"),
    ("/call", "Call any tool: /call <name> <json-arguments>"),
    ("/tools", "List available MCP tools"),
    ("/resources", "List resources"),
    ("/prompts", "List prompts"),
    ("/connect", "Retry the persistent WebSocket channel"),
    ("/state", "Show connection state"),
    ("/clear", "Clear the screen"),
    ("/help", "Show available commands"),
    ("/exit", "Quit the REPL"),
];

/// Commands whose first argument is a location.
const LOCATION_COMMANDS: &[&str] = &["/weather", "/forecast", "/insights", "/advisory"];

/// REPL helper for tab completion.
struct WeatherHelper {
    cities: Vec<String>,
}

impl Default for WeatherHelper {
    fn default() -> Self {
        Self {
            cities: MockWeatherProvider::known_locations(),
        }
    }
}

impl Completer for WeatherHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let input = &line[..pos];

        if !input.contains(' ') {
            let matches: Vec<Pair> = COMMANDS
                .iter()
                .filter(|(cmd, _)| cmd.starts_with(input))
                .map(|(cmd, desc)| Pair {
                    display: format!("{cmd:<12} {desc}"),
                    replacement: format!("{cmd} "),
                })
                .collect();
            return Ok((0, matches));
        }

        let (cmd, args) = input.split_once(' ').unwrap_or((input, ""));
        if LOCATION_COMMANDS.contains(&cmd) && !args.contains(' ') {
            let prefix = args.to_lowercase();
            let matches: Vec<Pair> = self
                .cities
                .iter()
                .filter(|c| c.to_lowercase().starts_with(&prefix))
                .map(|c| Pair {
                    display: c.clone(),
                    replacement: format!("{c} "),
                })
                .collect();
            return Ok((input.len() - args.len(), matches));
        }

        Ok((pos, Vec::new()))
    }
}

impl Hinter for WeatherHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos < line.len() || line.is_empty() {
            return None;
        }
        if line.starts_with('/') && !line.contains(' ') {
            for (cmd, _) in COMMANDS {
                if cmd.starts_with(line) && *cmd != line {
                    return Some(cmd[line.len()..].to_string());
                }
            }
        }
        None
    }
}

impl Highlighter for WeatherHelper {}
impl Validator for WeatherHelper {}
impl Helper for WeatherHelper {}

struct TabCompleteOrAcceptHint;

impl ConditionalEventHandler for TabCompleteOrAcceptHint {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        ctx: &EventContext<'_>,
    ) -> Option<Cmd> {
        if ctx.has_hint() {
            Some(Cmd::CompleteHint)
        } else {
            Some(Cmd::Complete)
        }
    }
}

/// Run the interactive REPL against `client`.
///
/// Blocks the calling thread; call it from `spawn_blocking` and pass the
/// runtime handle used to drive client requests.
pub fn run(client: &McpClient, runtime: Handle, server: &str) -> anyhow::Result<()> {
    eprintln!();
    eprintln!(
        "  \x1b[32m\u{25c9}\x1b[0m \x1b[1mweather-mcp v{SERVER_VERSION}\x1b[0m \x1b[90m- {server}\x1b[0m"
    );
    eprintln!();

    let _status = client.subscribe(|from, to| {
        eprintln!("  \x1b[90m[connection {from} -> {to}]\x1b[0m");
    });

    let state = runtime.block_on(client.connect());
    if state != ConnectionState::Connected {
        eprintln!("  WebSocket unavailable; using HTTP request/response.");
    }
    match runtime.block_on(client.initialize(Implementation::new("weather-mcp-repl", SERVER_VERSION))) {
        Ok(init) => eprintln!(
            "  Connected to {} v{} (protocol {})",
            init.server_info.name, init.server_info.version, init.protocol_version
        ),
        Err(e) => eprintln!("  \x1b[31mInitialize failed:\x1b[0m {e}"),
    }
    eprintln!(
        "    Press \x1b[36m/\x1b[0m to browse commands, \x1b[90mTab\x1b[0m to complete, \x1b[90m/exit\x1b[0m to quit."
    );
    eprintln!();

    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .completion_prompt_limit(20)
        .build();

    let mut rl: Editor<WeatherHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(config)?;
    rl.set_helper(Some(WeatherHelper::default()));
    rl.bind_sequence(
        KeyEvent::from('\t'),
        EventHandler::Conditional(Box::new(TabCompleteOrAcceptHint)),
    );

    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    let hist_path = std::path::PathBuf::from(&home).join(".weather_mcp_history");
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    let prompt = " \x1b[36mweather>\x1b[0m ";

    loop {
        match rl.readline(prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let input = line.strip_prefix('/').unwrap_or(line);
                if input.is_empty() {
                    cmd_help();
                    continue;
                }

                let (cmd, args) = input.split_once(' ').unwrap_or((input, ""));
                let args = args.trim();

                match cmd {
                    "exit" | "quit" => {
                        eprintln!("  Goodbye!");
                        break;
                    }
                    "help" | "h" | "?" => cmd_help(),
                    "clear" | "cls" => eprint!("\x1b[2J\x1b[H"),
                    "state" => eprintln!("  Connection: {}", client.state()),
                    "connect" => {
                        let state = runtime.block_on(client.reconnect());
                        eprintln!("  Connection: {state}");
                    }
                    "tools" => report(runtime.block_on(list_tools(client))),
                    "resources" => report(runtime.block_on(list_resources(client))),
                    "prompts" => report(runtime.block_on(list_prompts(client))),
                    "weather" | "forecast" | "insights" | "advisory" => {
                        match tool_call_for(cmd, args) {
                            Ok((name, arguments)) => show_tool(
                                runtime.block_on(client.call_tool(name, arguments)),
                            ),
                            Err(usage) => eprintln!("  Usage: {usage}"),
                        }
                    }
                    "call" => match parse_call(args) {
                        Ok((name, arguments)) => {
                            show_tool(runtime.block_on(client.call_tool(&name, arguments)))
                        }
                        Err(msg) => eprintln!("  {msg}"),
                    },
                    _ => {
                        eprintln!("  Unknown command '/{cmd}'. Type /help for commands.");
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("  \x1b[90m(Ctrl+C)\x1b[0m Type \x1b[1m/exit\x1b[0m to quit.");
            }
            Err(ReadlineError::Eof) => {
                eprintln!("  Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("  Error: {err}");
                break;
            }
        }
    }

    let _ = rl.save_history(&hist_path);

    Ok(())
}

fn cmd_help() {
    eprintln!();
    eprintln!("  Commands:");
    eprintln!();
    for (cmd, desc) in COMMANDS {
        eprintln!("    {cmd:<12} {desc}");
    }
    eprintln!();
    eprintln!("  Tip: Tab completes commands and known city names.");
    eprintln!();
}

/// Map a shortcut command to its tool call. Trailing words after the
/// location are the optional second argument.
fn tool_call_for(cmd: &str, args: &str) -> Result<(&'static str, Value), &'static str> {
    let (location, extra) = split_location(args);
    match cmd {
        "weather" => {
            let location = location.ok_or("/weather <location> [metric|imperial]")?;
            let mut arguments = json!({"location": location});
            if let Some(units) = extra {
                arguments["units"] = json!(units);
            }
            Ok(("get_weather", arguments))
        }
        "forecast" => {
            let location = location.ok_or("/forecast <location> [days]")?;
            let mut arguments = json!({"location": location});
            if let Some(days) = extra {
                let days: i64 = days.parse().map_err(|_| "/forecast <location> [days]")?;
                arguments["days"] = json!(days);
            }
            Ok(("get_forecast", arguments))
        }
        "insights" => {
            let location = location.ok_or("/insights <location> [activity]")?;
            let mut arguments = json!({"location": location});
            if let Some(activity) = extra {
                arguments["activity"] = json!(activity);
            }
            Ok(("get_weather_insights", arguments))
        }
        _ => {
            let location = location.ok_or("/advisory <location>")?;
            Ok(("get_weather_summary_advisory", json!({"location": location})))
        }
    }
}

/// Split `"New York imperial"` style input. Known multi-word cities are
/// matched first; otherwise the last word is the extra argument when more
/// than one word is given.
fn split_location(args: &str) -> (Option<String>, Option<String>) {
    let args = args.trim();
    if args.is_empty() {
        return (None, None);
    }
    let lower = args.to_lowercase();
    for city in MockWeatherProvider::known_locations() {
        let city_lower = city.to_lowercase();
        if lower == city_lower {
            return (Some(city), None);
        }
        if let Some(rest) = lower.strip_prefix(&format!("{city_lower} ")) {
            let extra = args[args.len() - rest.len()..].trim().to_string();
            return (Some(city), Some(extra).filter(|e| !e.is_empty()));
        }
    }
    match args.split_once(' ') {
        Some((location, extra)) => (Some(location.to_string()), Some(extra.trim().to_string())),
        None => (Some(args.to_string()), None),
    }
}

fn parse_call(args: &str) -> Result<(String, Value), String> {
    let (name, raw) = args.split_once(' ').unwrap_or((args, ""));
    if name.is_empty() {
        return Err("Usage: /call <name> <json-arguments>".to_string());
    }
    let arguments = if raw.trim().is_empty() {
        json!({})
    } else {
        serde_json::from_str(raw).map_err(|e| format!("Invalid JSON arguments: {e}"))?
    };
    Ok((name.to_string(), arguments))
}

fn show_tool(result: McpResult<ToolCallResult>) {
    match result {
        Ok(result) => {
            eprintln!();
            let marker = if result.is_error { "\x1b[33m" } else { "" };
            for line in result.joined_text().lines() {
                eprintln!("  {marker}{line}\x1b[0m");
            }
            eprintln!();
        }
        Err(e) => eprintln!("  \x1b[31mError:\x1b[0m {e}"),
    }
}

fn report(result: McpResult<Vec<(String, String)>>) {
    match result {
        Ok(rows) => {
            eprintln!();
            for (name, description) in rows {
                eprintln!("    {name:<30} {description}");
            }
            eprintln!();
        }
        Err(e) => eprintln!("  \x1b[31mError:\x1b[0m {e}"),
    }
}

async fn list_tools(client: &McpClient) -> McpResult<Vec<(String, String)>> {
    Ok(client
        .list_tools()
        .await?
        .into_iter()
        .map(|t| (t.name, t.description))
        .collect())
}

async fn list_resources(client: &McpClient) -> McpResult<Vec<(String, String)>> {
    Ok(client
        .list_resources()
        .await?
        .into_iter()
        .map(|r| (r.uri, r.description))
        .collect())
}

async fn list_prompts(client: &McpClient) -> McpResult<Vec<(String, String)>> {
    Ok(client
        .list_prompts()
        .await?
        .into_iter()
        .map(|p| (p.name, p.description.unwrap_or_default()))
        .collect())
}

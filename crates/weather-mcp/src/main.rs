//! weather-mcp server and client entry point.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use weather_mcp::config::{ConfigOverrides, ServerConfig};
use weather_mcp::transport::StdioTransport;
use weather_mcp::types::{HealthReport, InitializeResult, MCP_VERSION};

#[derive(Parser)]
#[command(
    name = "weather-mcp",
    about = "MCP server exposing weather tools, resources and prompts over JSON-RPC 2.0",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Listen host. Overrides MCP_SERVER_HOST.
    #[arg(long, global = true)]
    host: Option<String>,

    /// Listen port. Overrides PORT and MCP_SERVER_PORT.
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Per-call tool deadline in seconds. Overrides MCP_TOOL_TIMEOUT_SECS.
    #[arg(long, global = true)]
    tool_timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server over stdio (default).
    Serve,

    /// Start MCP server over HTTP and WebSocket.
    #[cfg(feature = "http")]
    ServeHttp,

    /// Print server capabilities, tools and a health snapshot as JSON.
    Info,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   weather-mcp completions bash > ~/.local/share/bash-completion/completions/weather-mcp
    ///   weather-mcp completions zsh > ~/.zfunc/_weather-mcp
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },

    /// Launch an interactive client REPL against a running server.
    #[cfg(feature = "http")]
    Repl {
        /// Server root URL.
        #[arg(long, env = "WEATHER_MCP_URL", default_value = "http://localhost:8000")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let overrides = ConfigOverrides {
        host: cli.host,
        port: cli.port,
        tool_timeout_secs: cli.tool_timeout,
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let config = ServerConfig::from_env()?.with_overrides(overrides)?;
            tracing::info!("weather-mcp server (stdio)");
            tracing::debug!("{config:?}");
            let transport = StdioTransport::new(config.build_handler()?);
            transport.run().await?;
        }

        #[cfg(feature = "http")]
        Commands::ServeHttp => {
            use weather_mcp::transport::HttpTransport;

            let config = ServerConfig::from_env()?.with_overrides(overrides)?;
            tracing::info!("weather-mcp server (http)");
            tracing::debug!("{config:?}");
            let transport = HttpTransport::new(config.build_handler()?);
            transport.run(&config.bind_addr()).await?;
        }

        Commands::Info => {
            let config = ServerConfig::from_env()?.with_overrides(overrides)?;
            let handler = config.build_handler()?;
            let init = InitializeResult::for_version(MCP_VERSION);
            let tools = handler.tools().list_tools();
            let info = serde_json::json!({
                "server": init.server_info,
                "protocol_version": init.protocol_version,
                "capabilities": init.capabilities,
                "tools": tools.iter().map(|t| &t.name).collect::<Vec<_>>(),
                "tool_count": tools.len(),
                "tool_timeout_secs": handler.tools().timeout().as_secs(),
                "health": HealthReport::snapshot(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "weather-mcp", &mut std::io::stdout());
        }

        #[cfg(feature = "http")]
        Commands::Repl { url } => {
            let runtime = tokio::runtime::Handle::current();
            tokio::task::spawn_blocking(move || {
                let client = weather_mcp::McpClient::for_server(&url);
                weather_mcp::repl::run(&client, runtime, &url)
            })
            .await??;
        }
    }

    Ok(())
}

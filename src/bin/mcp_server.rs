//! table-harvest MCP Server
//!
//! Exposes the harvest tools (navigate, extract the visible table, walk every
//! page of a listing) to MCP clients over stdio or streamable HTTP.

use clap::{Parser, ValueEnum};
use rmcp::{ServiceExt, transport::stdio};
use rmcp::transport::streamable_http_server::{StreamableHttpService, session::local::LocalSessionManager};
use table_harvest::browser::{ConnectionOptions, LaunchOptions};
use table_harvest::mcp::HarvestServer;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Transport {
    /// Standard input/output transport (default)
    Stdio,
    /// HTTP streamable transport
    Http,
}

#[derive(Parser)]
#[command(name = "mcp-server")]
#[command(version)]
#[command(about = "Table harvesting MCP server", long_about = None)]
struct Cli {
    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    executable_path: Option<String>,

    /// WebSocket endpoint URL for remote browser connection
    #[arg(long, value_name = "URL")]
    ws_endpoint: Option<String>,

    /// Persistent browser profile directory
    #[arg(long, value_name = "DIR")]
    user_data_dir: Option<String>,

    /// Transport type to use
    #[arg(long, short = 't', value_enum, default_value = "stdio")]
    transport: Transport,

    /// Port for HTTP transport (default: 3000)
    #[arg(long, short = 'p', default_value = "3000")]
    port: u16,

    /// HTTP streamable endpoint path (default: /mcp)
    #[arg(long, default_value = "/mcp")]
    http_path: String,
}

impl Cli {
    fn launch_options(&self) -> LaunchOptions {
        let mut options = LaunchOptions::new().headless(!self.headed);
        if let Some(ref path) = self.executable_path {
            options = options.chrome_path(path);
        }
        if let Some(ref dir) = self.user_data_dir {
            options = options.user_data_dir(dir);
        }
        options
    }
}

fn build_server(ws_endpoint: Option<&str>, options: &LaunchOptions) -> table_harvest::Result<HarvestServer> {
    match ws_endpoint {
        Some(url) => HarvestServer::connect(ConnectionOptions::new(url)),
        None => HarvestServer::with_options(options.clone()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the MCP stream, env_logger writes to stderr
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let options = cli.launch_options();

    log::info!("table-harvest MCP Server v{}", env!("CARGO_PKG_VERSION"));
    match cli.ws_endpoint {
        Some(ref endpoint) => log::info!("Connecting to browser at {}", endpoint),
        None => log::info!("Browser mode: {}", if options.headless { "headless" } else { "headed" }),
    }

    match cli.transport {
        Transport::Stdio => {
            log::info!("Ready to accept MCP connections via stdio");
            let service = build_server(cli.ws_endpoint.as_deref(), &options)?;
            let server = service.serve(stdio()).await?;
            let quit_reason = server.waiting().await?;
            log::info!("Server quit with reason: {:?}", quit_reason);
            // Let the browser process shut down before exit
            tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;
        }
        Transport::Http => {
            let bind_addr = format!("127.0.0.1:{}", cli.port);
            let ws_endpoint = cli.ws_endpoint.clone();

            let service_factory = move || {
                build_server(ws_endpoint.as_deref(), &options).map_err(std::io::Error::other)
            };

            let http_service = StreamableHttpService::new(
                service_factory,
                LocalSessionManager::default().into(),
                Default::default(),
            );

            let router = axum::Router::new().nest_service(&cli.http_path, http_service);

            log::info!("Ready to accept MCP connections at http://{}{}", bind_addr, cli.http_path);

            let listener = tokio::net::TcpListener::bind(bind_addr).await?;
            axum::serve(listener, router).await?;
        }
    }

    Ok(())
}

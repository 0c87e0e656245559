use std::net::SocketAddr;

use anyhow::Result;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use anomon_server::app;
use anomon_server::config::ServerConfig;
use anomon_server::state::AppState;

#[allow(clippy::print_stderr)]
fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  anomon-server [config.toml]    Start the server (default config/server.toml)");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if matches!(args.get(1).map(String::as_str), Some("--help" | "-h")) {
        print_usage();
        return Ok(());
    }
    let config_path = args
        .get(1)
        .map(String::as_str)
        .unwrap_or("config/server.toml");
    let config = ServerConfig::load(config_path)?;

    let filter = match std::env::var("RUST_LOG") {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => EnvFilter::try_new(&config.log_level)?,
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    run_server(config).await
}

async fn run_server(config: ServerConfig) -> Result<()> {
    let detector = format!("{}:{}", config.detector.host, config.detector.port);
    tracing::info!(
        http_port = config.http_port,
        db = %config.database.redacted_url(),
        detector = %detector,
        "anomon-server starting"
    );

    let http_addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let state = AppState::build(config).await?;
    let app = app::build_http_app(state);

    let listener = tokio::net::TcpListener::bind(http_addr).await?;
    tracing::info!(http = %http_addr, "Server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            signal::ctrl_c().await.ok();
            tracing::info!("Shutting down gracefully");
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

//! issuetrack-api: REST API server for the issuetrack issue tracker

use anyhow::Context;
use clap::Parser;
use issuetrack_api::AppState;
use issuetrack_core::{Config, Store};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "issuetrack-api")]
#[command(about = "In-memory, project-scoped issue tracker API")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $ISSUETRACK_CONFIG, then the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to bind
    #[arg(short, long)]
    port: Option<u16>,

    /// Print a commented default config file and exit
    #[arg(long)]
    print_default_config: bool,
}

fn init_tracing(config: &Config) {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| config.log.filter.clone());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", Config::default_with_comments());
        return Ok(());
    }

    let mut config = Config::resolve(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    init_tracing(&config);

    let state = Arc::new(AppState::new(Store::new()));
    let app = issuetrack_api::app(state);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Starting issuetrack-api on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

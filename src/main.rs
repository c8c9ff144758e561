//! docport - HTTP gateway for browsing MongoDB collections

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docport::{config::Args, db::MongoDriver, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("docport={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    let timeouts = args.connect_timeouts();
    info!("======================================");
    info!("  docport {}", env!("CARGO_PKG_VERSION"));
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!(
        "Connect timeout: {}ms, server selection timeout: {}ms",
        timeouts.connect.as_millis(),
        timeouts.server_selection.as_millis()
    );
    info!("Max page limit: {}", args.max_page_limit);
    info!("======================================");

    let driver = Arc::new(MongoDriver::with_app_name(args.app_name.clone()));
    let state = Arc::new(server::AppState::with_driver(args, driver));

    if let Err(e) = server::run(state).await {
        error!("Server error: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}

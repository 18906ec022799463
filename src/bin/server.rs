use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use stargazer::config::{get_config, CliArgs};
use stargazer::nasa::{NasaClient, NasaSource};
use stargazer::{create_app, db, logging, spawn_maintenance, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before clap reads them
    if dotenv::dotenv().is_ok() {
        println!("Loaded .env file");
    }

    let args = CliArgs::parse();
    let (log_format, debug) = (args.log_format, args.debug);

    // The log directory may come from the config file, so logging starts after it is read
    let config = get_config(args);
    let _log_guard = logging::init_logging(log_format, debug, config.log_dir.as_deref());
    info!(
        "Final configuration: database_url={}, bind_address={}, nasa_base_url={}, cache={}s, session_lifetime={}min",
        config.database_url,
        config.bind_address,
        config.nasa_base_url,
        config.cache_duration_secs,
        config.session_lifetime_minutes,
    );

    // Initialize the database pool and schema
    let pool = db::init_pool(&config.database_url)?;
    {
        let mut conn = pool.get().context("Failed to get a database connection")?;
        db::run_migrations(&mut conn)?;
    }

    let client = NasaClient::from_config(&config).context("Failed to build NASA client")?;
    let source: Arc<dyn NasaSource> = Arc::new(client);

    let bind_address = config.bind_address.clone();
    let state = AppState::with_source(Arc::new(pool), config, source);

    spawn_maintenance(state.clone());

    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gamedata_api::config::{AppConfig, StoreBackend};
use gamedata_api::database::{DataStore, MemoryStore, RestStore};
use gamedata_api::{app, AppState};

#[derive(Parser, Debug)]
#[command(name = "gamedata-api", version, about = "REST gateway for game data backed by a hosted table service")]
struct Args {
    /// Port to listen on (overrides PORT / GAMEDATA_API_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Address to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Serve from in-process tables instead of the hosted service
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up SUPABASE_URL, SUPABASE_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gamedata_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    if args.memory {
        std::env::set_var("STORE_BACKEND", "memory");
    }

    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(port) = args.port {
        config.api.port = port;
    }
    if let Some(host) = args.host {
        config.api.host = host;
    }

    tracing::info!("Starting gamedata-api in {:?} mode", config.environment);
    if config.uses_fallback_secret() {
        tracing::warn!("JWT_SECRET is not set; signing tokens with the built-in fallback secret");
    }

    let store = build_store(&config)?;
    if let Err(e) = store.health_check().await {
        tracing::warn!("Table service did not answer the startup probe: {}", e);
    }

    let bind_addr = format!("{}:{}", config.api.host, config.api.port);
    let state = AppState::new(config, store);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn DataStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory table store");
            Ok(Arc::new(MemoryStore::with_default_constraints()))
        }
        StoreBackend::Rest => {
            // validate() guarantees both are present for this backend
            let url = config.store.url.as_deref().context("Missing SUPABASE_URL")?;
            let key = config.store.key.as_deref().context("Missing SUPABASE_KEY")?;
            let store = RestStore::new(url, key).context("failed to create table service client")?;
            tracing::info!("Using table service at {}", url);
            Ok(Arc::new(store))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}

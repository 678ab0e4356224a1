use anyhow::Context;
use tracing_subscriber::EnvFilter;

use shop_api_rust::auth::TokenAuthenticator;
use shop_api_rust::config;
use shop_api_rust::database::{DatabaseManager, Store};
use shop_api_rust::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECURITY_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config();
    tracing::info!("Starting Shop API in {:?} mode", config.environment);

    if shop_api_rust::is_production!() && config.security.jwt_secret.is_empty() {
        anyhow::bail!("SECURITY_JWT_SECRET must be set in production");
    }
    let authenticator = TokenAuthenticator::new(&config.security)
        .context("token verification key is not configured")?;

    let (store, database) = match &config.database.url {
        Some(_) => {
            let database = DatabaseManager::connect(&config.database).await?;
            if config.database.run_migrations {
                database.migrate().await?;
            }
            (Store::postgres(database.pool().clone()), Some(database))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using the in-memory store");
            (Store::in_memory(), None)
        }
    };

    let app = shop_api_rust::app(AppState::new(store, authenticator, database.clone()));

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Shop API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(database) = database {
        database.close().await;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

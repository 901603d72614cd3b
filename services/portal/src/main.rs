use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod auth;
mod database;
mod error;
mod middleware;
mod models;
mod password;
mod rate_limiter;
mod repositories;
mod routes;
mod session;
mod settings;
mod state;
mod templates;
mod validation;

#[cfg(test)]
mod testing;

use common::{
    cache::{RedisConfig, RedisPool},
    database::DatabaseConfig,
};
use tokio::net::TcpListener;

use crate::{
    repositories::UserRepository, session::RedisSessionStore, settings::AppConfig, state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting portal");

    let config = AppConfig::from_env()?;

    // User store
    let db_config = DatabaseConfig::from_env()?;
    let pool = database::connect(&db_config).await?;
    let user_repository = UserRepository::new(pool);

    // Session store
    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config)?;
    match redis_pool.health_check().await {
        Ok(true) => info!("Session store connection successful"),
        Ok(false) => warn!("Session store answered PING unexpectedly"),
        Err(e) => warn!("Session store unreachable at startup: {}", e),
    }

    let app_state = AppState::new(
        Arc::new(user_repository),
        Arc::new(RedisSessionStore::new(redis_pool)),
        config.session_ttl_seconds,
        config.cookie_key(),
        config.cookie_secure,
    );

    // Start the web server
    let app = routes::create_router(app_state, &config.static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("Portal listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Portal shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}

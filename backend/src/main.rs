//! Backend entry-point: loads settings, prepares storage, and serves the REST API.

mod server;

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{ServerConfig, ServerSettings, create_server};

/// Apply embedded migrations, then open the connection pool.
async fn prepare_database(url: String, pool_size: u32) -> std::io::Result<DbPool> {
    let migration_url = url.clone();
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&migration_url))
        .await
        .map_err(|err| std::io::Error::other(format!("migration task failed: {err}")))?
        .map_err(|err| std::io::Error::other(format!("database migrations failed: {err}")))?;
    info!(count = applied.len(), migrations = ?applied, "database schema up to date");

    DbPool::new(PoolConfig::new(url).with_max_size(pool_size))
        .await
        .map_err(|err| std::io::Error::other(format!("database pool setup failed: {err}")))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load_for_process()?;
    let bind_addr = settings.bind_addr()?;
    let jwt_secret = settings.jwt_secret();
    if jwt_secret.is_none() {
        warn!("no JWT signing key configured; login and protected routes will fail");
    }

    let mut config = ServerConfig::new(bind_addr, jwt_secret);
    if let Some(url) = settings.database_url() {
        let pool = prepare_database(url, settings.pool_size()).await?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "listening");
    server.await
}

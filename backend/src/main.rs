//! Backend entry-point: loads configuration, runs migrations and serves the
//! REST API with its OpenAPI docs.

mod server;

use actix_web::web;
use color_eyre::eyre::{WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use patrimony::inbound::http::health::HealthState;
use patrimony::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use patrimony::settings::AppSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| eyre!("loading configuration: {err}"))?;
    let bind_addr = settings.bind_addr()?;
    let mut config = ServerConfig::new(bind_addr, settings.clone());

    match settings.database_url() {
        Some(url) => {
            let migration_url = url.to_owned();
            let applied =
                tokio::task::spawn_blocking(move || run_pending_migrations(&migration_url))
                    .await
                    .wrap_err("migration task panicked")??;
            info!(applied, "database migrations complete");
            let pool = DbPool::new(PoolConfig::new(url))
                .await
                .wrap_err("connecting to the database")?;
            config = config.with_db_pool(pool);
        }
        None => warn!("no database URL configured; repositories use fixtures"),
    }

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting server");
    create_server(health_state, config)?.await?;
    Ok(())
}

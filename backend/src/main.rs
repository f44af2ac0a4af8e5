//! Campus service entry-point: loads settings, prepares persistence and the
//! admin account, then serves the REST API.

mod server;

use std::ffi::OsString;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use campus::AppSettings;
use campus::domain::AdminCredentials;
use campus::inbound::http::health::HealthState;
use campus::inbound::http::session_config::{BuildMode, session_settings_from_env};
use campus::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{ServerConfig, create_server};

fn io_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {err}"))
}

async fn server_config(settings: &AppSettings) -> std::io::Result<ServerConfig> {
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::current())
        .map_err(|err| io_error("invalid session configuration", err))?;
    let mut config = ServerConfig::new(session, settings.bind_addr());

    if let Some(url) = settings.database_url.as_deref() {
        run_pending_migrations(url)
            .await
            .map_err(|err| io_error("database migrations", err))?;
        let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.db_pool_size))
            .await
            .map_err(|err| io_error("database pool", err))?;
        config = config.with_db_pool(pool);
    } else {
        warn!("CAMPUS_DATABASE_URL not set; data will not survive a restart");
    }

    if let Some((username, password)) = settings.admin_credentials() {
        let admin = AdminCredentials::try_new(username, password)
            .map_err(|err| io_error("invalid admin credentials", err))?;
        config = config.with_admin(admin);
    }
    Ok(config)
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

    let settings = AppSettings::load_from_iter(std::env::args_os().collect::<Vec<OsString>>())
        .map_err(|err| io_error("failed to load settings", err))?;
    let config = server_config(&settings).await?;
    let bind_addr = config.bind_addr();

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config).await?;
    info!(%bind_addr, "campus service listening");

    let handle = server.handle();
    actix_web::rt::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            health_state.mark_draining();
            handle.stop(true).await;
        }
    });

    server.await
}

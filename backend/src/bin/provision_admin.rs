//! Create or promote the administrator account in PostgreSQL.
//!
//! Safe to run repeatedly; an existing admin is left untouched and an
//! existing non-admin account with the same username is promoted.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io;
use std::sync::Arc;

use campus::domain::{AdminCredentials, AdminProvisioner, ProvisionOutcome};
use campus::outbound::argon2_hasher::Argon2Hasher;
use campus::outbound::persistence::{
    DbPool, DieselUserRepository, PoolConfig, run_pending_migrations,
};
use clap::Parser;
use mockable::DefaultClock;
use tokio::runtime::Builder;
use zeroize::Zeroizing;

const DATABASE_URL_ENV: &str = "CAMPUS_DATABASE_URL";
const PASSWORD_ENV: &str = "CAMPUS_ADMIN_PASSWORD";

/// `provision-admin` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "provision-admin",
    about = "Ensure an administrator account exists",
    version
)]
struct CliArgs {
    /// Administrator username.
    #[arg(long, value_name = "name")]
    username: String,
    /// Administrator password. Falls back to `CAMPUS_ADMIN_PASSWORD`.
    #[arg(long, value_name = "secret")]
    password: Option<String>,
    /// Database connection URL. Falls back to `CAMPUS_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let password = Zeroizing::new(resolve(args.password, PASSWORD_ENV, "--password")?);
    let credentials = AdminCredentials::try_new(&args.username, &password)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error.to_string()))?;
    let database_url = resolve(args.database_url, DATABASE_URL_ENV, "--database-url")?;

    run_pending_migrations(&database_url)
        .await
        .map_err(|error| io::Error::other(format!("apply migrations: {error}")))?;
    let pool = DbPool::new(PoolConfig::new(&database_url))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
    let hasher = Argon2Hasher::new()
        .map_err(|error| io::Error::other(format!("configure hasher: {error}")))?;

    let provisioner = AdminProvisioner::new(
        Arc::new(DieselUserRepository::new(pool)),
        Arc::new(hasher),
        Arc::new(DefaultClock),
    );
    let outcome = provisioner
        .ensure(&credentials)
        .await
        .map_err(|error| io::Error::other(format!("provisioning failed: {error}")))?;

    println!("outcome={}", describe(outcome));
    println!("user_id={}", outcome.user_id());
    Ok(())
}

fn describe(outcome: ProvisionOutcome) -> &'static str {
    match outcome {
        ProvisionOutcome::Created(_) => "created",
        ProvisionOutcome::Promoted(_) => "promoted",
        ProvisionOutcome::Unchanged(_) => "unchanged",
    }
}

/// Prefer the explicit flag, then the environment variable.
fn resolve(explicit: Option<String>, env_name: &str, flag: &str) -> io::Result<String> {
    let value = match explicit {
        Some(value) => value,
        None => env::var(env_name).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("missing value: set {flag} or {env_name}"),
            )
        })?,
    };
    if value.trim().is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{flag} must not be empty"),
        ));
    }
    Ok(value)
}

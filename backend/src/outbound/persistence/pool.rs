//! `bb8` pool of `diesel-async` PostgreSQL connections.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

use crate::domain::ports::define_port_error;

define_port_error! {
    /// Pool construction and checkout failures.
    pub enum PoolError {
        /// No connection became free before the checkout timeout.
        Checkout { message: String } => "database connection unavailable: {message}",
        /// The URL was rejected or the first connections could not be opened.
        Build { message: String } => "database pool could not start: {message}",
    }
}

const DEFAULT_MAX_SIZE: u32 = 10;
const DEFAULT_MIN_IDLE: u32 = 2;
const DEFAULT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(10);

/// Pool sizing and timeouts.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use campus::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("postgres://campus@localhost/campus")
///     .with_max_size(20)
///     .with_connection_timeout(Duration::from_secs(5));
/// assert_eq!(config.database_url(), "postgres://campus@localhost/campus");
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    min_idle: Option<u32>,
    connection_timeout: Duration,
}

impl PoolConfig {
    /// Defaults: ten connections, two idle, ten second checkout timeout.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: DEFAULT_MAX_SIZE,
            min_idle: Some(DEFAULT_MIN_IDLE),
            connection_timeout: DEFAULT_CHECKOUT_TIMEOUT,
        }
    }

    /// Upper bound on open connections; zero is raised to one.
    pub fn with_max_size(self, max_size: u32) -> Self {
        Self {
            max_size: max_size.max(1),
            ..self
        }
    }

    /// Idle connections to keep open; `None` lets `bb8` decide.
    pub fn with_min_idle(self, min_idle: Option<u32>) -> Self {
        Self { min_idle, ..self }
    }

    /// How long a checkout waits for a free connection.
    pub fn with_connection_timeout(self, connection_timeout: Duration) -> Self {
        Self {
            connection_timeout,
            ..self
        }
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Idle connections kept open, never more than the pool can hold.
    fn effective_min_idle(&self) -> Option<u32> {
        self.min_idle.map(|idle| idle.min(self.max_size))
    }
}

/// Shared handle to the connection pool; cheap to clone.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Open the pool.
    ///
    /// # Errors
    ///
    /// [`PoolError::Build`] when the URL is invalid or the idle connections
    /// cannot be opened.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.database_url());
        Pool::builder()
            .max_size(config.max_size)
            .min_idle(config.effective_min_idle())
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map(|inner| Self { inner })
            .map_err(|err| PoolError::build(err.to_string()))
    }

    /// Borrow a connection for one unit of work.
    ///
    /// # Errors
    ///
    /// [`PoolError::Checkout`] when the checkout timeout elapses.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const URL: &str = "postgres://localhost/campus";

    #[rstest]
    fn defaults_match_the_settings_layer() {
        let config = PoolConfig::new(URL);
        assert_eq!(config.max_size, DEFAULT_MAX_SIZE);
        assert_eq!(config.effective_min_idle(), Some(DEFAULT_MIN_IDLE));
        assert_eq!(config.connection_timeout, DEFAULT_CHECKOUT_TIMEOUT);
    }

    #[rstest]
    #[case(0, Some(2), 1, Some(1))]
    #[case(1, Some(2), 1, Some(1))]
    #[case(4, None, 4, None)]
    #[case(20, Some(5), 20, Some(5))]
    fn idle_connections_never_exceed_the_pool(
        #[case] max_size: u32,
        #[case] min_idle: Option<u32>,
        #[case] expected_max: u32,
        #[case] expected_idle: Option<u32>,
    ) {
        let config = PoolConfig::new(URL)
            .with_max_size(max_size)
            .with_min_idle(min_idle);
        assert_eq!(config.max_size, expected_max);
        assert_eq!(config.effective_min_idle(), expected_idle);
    }

    #[rstest]
    fn errors_name_their_stage() {
        assert_eq!(
            PoolError::checkout("timed out").to_string(),
            "database connection unavailable: timed out"
        );
        assert!(matches!(PoolError::build("bad url"), PoolError::Build { .. }));
    }
}

//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use campus::domain::AdminCredentials;
use campus::inbound::http::session_config::SessionSettings;
use campus::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) admin: Option<AdminCredentials>,
}

impl ServerConfig {
    /// Configuration that serves from the in-memory store.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        Self {
            session,
            bind_addr,
            db_pool: None,
            admin: None,
        }
    }

    /// Use PostgreSQL-backed adapters for every driven port.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Ensure this administrator exists before the server binds.
    #[must_use]
    pub fn with_admin(mut self, admin: AdminCredentials) -> Self {
        self.admin = Some(admin);
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

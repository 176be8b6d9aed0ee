//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use patrimony::outbound::persistence::DbPool;
use patrimony::settings::AppSettings;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) settings: AppSettings,
}

impl ServerConfig {
    /// Construct a server configuration from loaded settings.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, settings: AppSettings) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            settings,
        }
    }

    /// Attach a database connection pool for the Diesel repositories.
    ///
    /// Without a pool every repository port uses its fixture.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}

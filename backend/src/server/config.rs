//! Server settings loaded via OrthoConfig, and the resolved server
//! configuration handed to [`super::create_server`].

use std::ffi::OsString;
use std::fmt;
use std::net::SocketAddr;

use backend::outbound::persistence::{DEFAULT_POOL_SIZE, DbPool};
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
/// Conventional variable consulted when `TRAVEL_JWT_SECRET_KEY` is unset.
pub const FALLBACK_JWT_SECRET_VAR: &str = "JWT_SECRET_KEY";

/// Raw settings from CLI flags, `TRAVEL_*` environment variables, and
/// configuration files.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TRAVEL")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory stores are used when absent.
    pub database_url: Option<String>,
    /// HS256 signing key for bearer credentials.
    pub jwt_secret_key: Option<String>,
    /// Maximum pooled database connections.
    #[ortho_config(default = DEFAULT_POOL_SIZE)]
    pub pool_size: u32,
}

impl fmt::Debug for ServerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerSettings")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("jwt_secret_key", &self.jwt_secret_key.as_ref().map(|_| "<redacted>"))
            .field("pool_size", &self.pool_size)
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

impl ServerSettings {
    /// Load settings for the process.
    ///
    /// # Errors
    /// Returns an I/O error describing the configuration failure.
    pub fn load_for_process() -> std::io::Result<Self> {
        Self::load_from_args(std::env::args_os())
    }

    /// Load settings from explicit arguments; the environment still applies.
    ///
    /// # Errors
    /// Returns an I/O error describing the configuration failure.
    pub fn load_from_args<I>(args: I) -> std::io::Result<Self>
    where
        I: IntoIterator<Item = OsString>,
    {
        Self::load_from_iter(args)
            .map_err(|err| std::io::Error::other(format!("invalid configuration: {err}")))
    }

    /// Address to bind, defaulting to `0.0.0.0:8080`.
    ///
    /// # Errors
    /// Fails when the configured value is not a socket address.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid bind address {raw:?}: {err}"),
            )
        })
    }

    pub fn database_url(&self) -> Option<String> {
        non_blank(self.database_url.clone())
    }

    /// Signing key, falling back to `JWT_SECRET_KEY`.
    pub fn jwt_secret(&self) -> Option<String> {
        non_blank(self.jwt_secret_key.clone())
            .or_else(|| non_blank(std::env::var(FALLBACK_JWT_SECRET_VAR).ok()))
    }

    pub fn pool_size(&self) -> u32 {
        self.pool_size.max(1)
    }
}

/// Resolved configuration for [`super::create_server`].
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) jwt_secret: Option<String>,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, jwt_secret: Option<String>) -> Self {
        Self {
            bind_addr,
            jwt_secret,
            db_pool: None,
        }
    }

    /// Use the Diesel repositories backed by `pool`.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}

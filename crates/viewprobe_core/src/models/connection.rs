//! Connection parameters and injected credentials.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Host every connection targets.
pub const DEFAULT_HOST: &str = "localhost";

/// Port every connection targets.
pub const DEFAULT_PORT: u16 = 13307;

/// Default for the connect, acquire and query timeouts.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Parameters for opening a database connection.
///
/// Credentials are deliberately absent. They are resolved outside this crate
/// and handed to [`crate::services::connect`] separately as [`Credentials`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionParameters {
    /// Server hostname or IP
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database name, exactly as supplied by the caller
    pub database: String,
    /// TCP connect timeout per attempt
    pub connect_timeout_ms: u64,
    /// Limit on establishing a usable connection, handshake included
    pub acquire_timeout_ms: u64,
    /// Server-side statement timeout
    pub query_timeout_ms: u64,
}

impl ConnectionParameters {
    /// Build parameters for `database` using the fixed connection defaults.
    ///
    /// Performs no validation and never fails; an empty name is kept as-is.
    pub fn for_database(database: impl Into<String>) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database: database.into(),
            connect_timeout_ms: DEFAULT_TIMEOUT_MS,
            acquire_timeout_ms: DEFAULT_TIMEOUT_MS,
            query_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Connect timeout as a `Duration`.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Acquire timeout as a `Duration`.
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    /// Build the tokio-postgres configuration for these parameters.
    pub fn to_pg_config(&self, credentials: &Credentials) -> tokio_postgres::Config {
        let mut pg_config = tokio_postgres::Config::new();
        pg_config.host(&self.host);
        pg_config.port(self.port);
        pg_config.dbname(&self.database);
        pg_config.user(&credentials.username);
        if let Some(password) = &credentials.password {
            pg_config.password(password);
        }
        pg_config.application_name("viewprobe");
        pg_config.connect_timeout(self.connect_timeout());
        pg_config.options(format!("-c statement_timeout={}", self.query_timeout_ms));
        pg_config
    }

    /// Get the display connection string (never includes credentials).
    pub fn display_url(&self) -> String {
        format!("postgresql://{}:{}/{}", self.host, self.port, self.database)
    }
}

/// Build connection parameters for `database`.
pub fn build_config(database: impl Into<String>) -> ConnectionParameters {
    ConnectionParameters::for_database(database)
}

/// A resolved credential set.
///
/// Produced by whatever reads the ambient client configuration; this crate
/// only consumes it at connect time.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Login username
    pub username: String,
    /// Password, if the server requires one
    pub password: Option<String>,
}

impl Credentials {
    /// Create credentials without a password.
    pub fn new(username: impl Into<String>) -> Self {
        Self { username: username.into(), password: None }
    }

    /// Set the password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

use std::fmt;
use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

/// Where contributions and entity rows are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Postgres,
    /// In-process store; nothing survives a restart.
    Memory,
}

impl DataSource {
    pub fn as_str(self) -> &'static str {
        match self {
            DataSource::Postgres => "postgres",
            DataSource::Memory => "memory",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(DataSource::Postgres),
            "memory" => Ok(DataSource::Memory),
            other => Err(format!(
                "unknown data source '{other}', expected 'postgres' or 'memory'"
            )),
        }
    }
}

/// Credentials for the single moderator account.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub username: String,
    /// Argon2id PHC string. Login is disabled while this is `None`.
    pub password_hash: Option<String>,
}

impl AdminConfig {
    /// | Env Var               | Default |
    /// |-----------------------|---------|
    /// | `ADMIN_USERNAME`      | `admin` |
    /// | `ADMIN_PASSWORD_HASH` | unset   |
    pub fn from_env() -> Self {
        let username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into());
        let password_hash = std::env::var("ADMIN_PASSWORD_HASH")
            .ok()
            .filter(|h| !h.trim().is_empty());

        Self {
            username,
            password_hash,
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub data_source: DataSource,
    /// Required when `data_source` is [`DataSource::Postgres`].
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub admin: AdminConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `DATA_SOURCE`          | `postgres`                 |
    /// | `DATABASE_URL`         | required for `postgres`    |
    ///
    /// # Panics
    ///
    /// Panics on any malformed value, or when `DATA_SOURCE=postgres` and
    /// `DATABASE_URL` is missing.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let data_source: DataSource = std::env::var("DATA_SOURCE")
            .unwrap_or_else(|_| "postgres".into())
            .parse()
            .unwrap_or_else(|e| panic!("DATA_SOURCE is invalid: {e}"));

        let database_url = std::env::var("DATABASE_URL").ok();
        if data_source == DataSource::Postgres {
            assert!(
                database_url.is_some(),
                "DATABASE_URL must be set when DATA_SOURCE=postgres"
            );
        }

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            data_source,
            database_url,
            jwt: JwtConfig::from_env(),
            admin: AdminConfig::from_env(),
        }
    }
}

//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::AppError;

/// Default listen host.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default listen port.
pub const DEFAULT_PORT: u16 = 3000;
/// Default size of the PostgreSQL pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
/// Default broadcast capacity per interaction.
pub const DEFAULT_NOTIFICATION_BUFFER: usize = 256;

/// Startup configuration for the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// PostgreSQL connection string. Without one the server keeps
    /// everything in memory.
    pub database_url: Option<String>,
    /// Listen host.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Maximum PostgreSQL pool size.
    pub database_max_connections: u32,
    /// Notifications buffered per interaction before slow observers skip.
    pub notification_buffer: usize,
    /// OTLP collector endpoint; span export is off when absent.
    pub otlp_endpoint: Option<String>,
    /// JSON file seeding the in-memory participant directory.
    pub directory_seed_file: Option<PathBuf>,
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable holds an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`. Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable holds an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Self {
            database_url: get("DATABASE_URL"),
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port: parse_or("PORT", get("PORT"), DEFAULT_PORT)?,
            database_max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                get("DATABASE_MAX_CONNECTIONS"),
                DEFAULT_MAX_CONNECTIONS,
            )?,
            notification_buffer: parse_or(
                "NOTIFICATION_BUFFER",
                get("NOTIFICATION_BUFFER"),
                DEFAULT_NOTIFICATION_BUFFER,
            )?,
            otlp_endpoint: get("OTEL_EXPORTER_OTLP_ENDPOINT"),
            directory_seed_file: get("DIRECTORY_SEED_FILE").map(PathBuf::from),
        })
    }

    /// The address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T, AppError>
where
    T: FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value: T = raw
        .trim()
        .parse()
        .map_err(|e| AppError::Config(format!("{key} must be a positive integer: {e}")))?;
    if value <= T::default() {
        return Err(AppError::Config(format!("{key} must be greater than zero")));
    }
    Ok(value)
}

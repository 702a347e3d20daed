//! Server configuration.

use std::net::SocketAddr;

use muster_core::{BatchLimit, Error, LogFormat, Result};

/// Environment variable for the listen address.
pub const ENV_BIND_ADDR: &str = "MUSTER_BIND_ADDR";
/// Environment variable for the log format (`json` or `pretty`).
pub const ENV_LOG_FORMAT: &str = "MUSTER_LOG_FORMAT";
/// Environment variable for the store's in-query limit.
pub const ENV_IN_QUERY_LIMIT: &str = "MUSTER_IN_QUERY_LIMIT";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Server configuration, derived from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server listens on.
    pub bind_addr: SocketAddr,
    /// Log output format.
    pub log_format: LogFormat,
    /// In-query limit used when chunking id-list lookups.
    pub in_query_limit: BatchLimit,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.parse().expect("default addr is valid"),
            log_format: LogFormat::default(),
            in_query_limit: BatchLimit::DEFAULT,
        }
    }
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` when a variable is present but
    /// unparseable.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_BIND_ADDR) {
            config.bind_addr = raw.parse().map_err(|_| {
                Error::invalid_argument(format!("{ENV_BIND_ADDR} is not a socket address: {raw}"))
            })?;
        }
        if let Some(raw) = lookup(ENV_LOG_FORMAT) {
            config.log_format = raw.parse()?;
        }
        if let Some(raw) = lookup(ENV_IN_QUERY_LIMIT) {
            let limit: usize = raw.parse().map_err(|_| {
                Error::invalid_argument(format!("{ENV_IN_QUERY_LIMIT} is not a number: {raw}"))
            })?;
            config.in_query_limit = BatchLimit::new(limit)?;
        }

        Ok(config)
    }
}

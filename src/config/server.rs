use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use super::errors::{ConfigError, ConfigResult};

const DEFAULT_PORT: u16 = 3000;

/// Runtime settings for the HTTP service
///
/// Read from the process environment (after `.env` is loaded):
/// - `HOST` - bind address, defaults to `0.0.0.0`
/// - `PORT` - bind port, defaults to `3000`
/// - `TEAMFORGE_DATA_DIR` - when set, teams persist to `teams.json` there
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub data_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            data_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let defaults = Self::default();

        let host = match lookup("HOST") {
            Some(value) => value
                .parse::<IpAddr>()
                .map_err(|_| ConfigError::InvalidEnv { key: "HOST", value })?,
            None => defaults.addr.ip(),
        };

        let port = match lookup("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidEnv { key: "PORT", value })?,
            None => {
                tracing::warn!("PORT not set, using default {}", DEFAULT_PORT);
                DEFAULT_PORT
            }
        };

        let data_dir = lookup("TEAMFORGE_DATA_DIR")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            addr: SocketAddr::new(host, port),
            data_dir,
        })
    }
}

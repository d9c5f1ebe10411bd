//! Server configuration parsed from environment variables.
//!
//! `from_env` reads the process environment; `from_lookup` takes any key
//! lookup so tests never touch global env state.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_BIND_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
pub const DEFAULT_CLIENT_URL: &str = "http://localhost:3000";
pub const DEFAULT_PEER_BUFFER: usize = 1024;

/// Origins that are always accepted, in addition to `CLIENT_URL`.
pub const DEFAULT_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid PORT: {0}")]
    InvalidPort(String),
    #[error("invalid BIND_ADDR: {0}")]
    InvalidBindAddr(String),
    #[error("invalid PEER_BUFFER: {0} (expected a positive integer)")]
    InvalidPeerBuffer(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    /// Browser origins allowed to open a socket. Never empty.
    pub allowed_origins: Vec<String>,
    /// Capacity of each connection's outbound channel.
    pub peer_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR,
            port: DEFAULT_PORT,
            allowed_origins: merge_origins(DEFAULT_CLIENT_URL, None),
            peer_buffer: DEFAULT_PEER_BUFFER,
        }
    }
}

impl ServerConfig {
    /// Build typed server config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3001
    /// - `BIND_ADDR`: default `0.0.0.0`
    /// - `CLIENT_URL`: default `http://localhost:3000`
    /// - `ALLOWED_ORIGINS`: extra comma-separated origins
    /// - `PEER_BUFFER`: default 1024
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] over an arbitrary lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is present but unparseable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };
        let bind_addr = match lookup("BIND_ADDR") {
            Some(raw) => raw
                .trim()
                .parse::<IpAddr>()
                .map_err(|_| ConfigError::InvalidBindAddr(raw))?,
            None => DEFAULT_BIND_ADDR,
        };
        let peer_buffer = match lookup("PEER_BUFFER") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::InvalidPeerBuffer(raw)),
            },
            None => DEFAULT_PEER_BUFFER,
        };
        let client_url = lookup("CLIENT_URL").unwrap_or_else(|| DEFAULT_CLIENT_URL.to_owned());
        let extra = lookup("ALLOWED_ORIGINS");
        let allowed_origins = merge_origins(&client_url, extra.as_deref());

        Ok(Self { bind_addr, port, allowed_origins, peer_buffer })
    }

    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    /// A missing origin is allowed (non-browser clients send none).
    #[must_use]
    pub fn origin_allowed(&self, origin: Option<&str>) -> bool {
        origin.is_none_or(|o| self.allowed_origins.iter().any(|allowed| allowed == o))
    }
}

fn merge_origins(client_url: &str, extra: Option<&str>) -> Vec<String> {
    let mut origins: Vec<String> = Vec::new();
    let candidates = std::iter::once(client_url)
        .chain(DEFAULT_ORIGINS)
        .chain(extra.into_iter().flat_map(|list| list.split(',')));
    for candidate in candidates {
        let origin = candidate.trim().trim_end_matches('/');
        if !origin.is_empty() && !origins.iter().any(|o| o == origin) {
            origins.push(origin.to_owned());
        }
    }
    origins
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

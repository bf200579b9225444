//! Server configuration read from the environment.
//!
//! `HOST` (default `0.0.0.0`), `PORT` (default 8080), `DATABASE_URL` (unset means
//! the in-memory store) and `DATABASE_MAX_CONNECTIONS` (default 5). Values that
//! fail to parse fall back to their defaults.

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_connections() -> u32 {
    5
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_url: None,
            max_connections: default_max_connections(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup (the environment, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup("HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(default_host);
        let port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or_else(default_port);
        let database_url = lookup("DATABASE_URL").filter(|u| !u.trim().is_empty());
        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .and_then(|n| n.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or_else(default_max_connections);
        Self {
            host,
            port,
            database_url,
            max_connections,
        }
    }
}

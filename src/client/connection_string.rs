//! Connection string parsing
//!
//! Supports formats:
//! * h2://host[:port]/database
//! * h2:tcp://host[:port]/database?user=sa&password=&KEY=VALUE
//!
//! The `user` and `password` query parameters become credentials; every other
//! parameter becomes a session property, in order of appearance. The port
//! defaults to the server's standard TCP port.

use crate::connection::ConnectionConfig;
use crate::protocol::constants::DEFAULT_TCP_PORT;
use crate::{Error, Result};

/// Parsed connection info
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    /// Server hostname
    pub host: String,
    /// Server TCP port
    pub port: u16,
    /// Database name (may itself contain slashes, e.g. `~/test`)
    pub database: String,
    /// Username
    pub user: String,
    /// Password
    pub password: String,
    /// Session properties, in order of appearance
    pub properties: Vec<(String, String)>,
}

impl ConnectionInfo {
    /// Parse connection string
    pub fn parse(s: &str) -> Result<Self> {
        let rest = s
            .strip_prefix("h2:tcp://")
            .or_else(|| s.strip_prefix("h2://"))
            .ok_or_else(|| {
                Error::Config("connection string must start with h2:// or h2:tcp://".into())
            })?;

        let (authority, path) = rest.split_once('/').ok_or_else(|| {
            Error::Config("connection string is missing a database name".into())
        })?;

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| Error::Config(format!("invalid port: {}", port)))?;
                (host, port)
            }
            None => (authority, DEFAULT_TCP_PORT),
        };
        if host.is_empty() {
            return Err(Error::Config("connection string is missing a host".into()));
        }

        let (database, query_string) = match path.split_once('?') {
            Some((database, query)) => (database, query),
            None => (path, ""),
        };
        if database.is_empty() {
            return Err(Error::Config(
                "connection string is missing a database name".into(),
            ));
        }

        let mut user = String::new();
        let mut password = String::new();
        let mut properties = Vec::new();
        for pair in query_string.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                Error::Config(format!("malformed query parameter: {}", pair))
            })?;
            match key {
                "user" => user = value.to_string(),
                "password" => password = value.to_string(),
                _ => properties.push((key.to_string(), value.to_string())),
            }
        }

        Ok(Self {
            host: host.to_string(),
            port,
            database: database.to_string(),
            user,
            password,
            properties,
        })
    }

    /// Convert into connection configuration
    pub fn to_config(&self) -> ConnectionConfig {
        let mut config = ConnectionConfig::new(self.host.clone(), self.port, self.database.clone())
            .user(self.user.clone())
            .password(self.password.clone());
        for (key, value) in &self.properties {
            config = config.property(key.clone(), value.clone());
        }
        config
    }
}

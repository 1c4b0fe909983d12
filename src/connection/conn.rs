//! Core connection type

use super::state::ConnectionState;
use crate::protocol::{
    constants::{TCP_PROTOCOL_VERSION_MAX_SUPPORTED, TCP_PROTOCOL_VERSION_MIN_SUPPORTED},
    Status, Transfer,
};
use crate::{auth, Error, Result};
use futures::future::BoxFuture;
use tokio::net::TcpStream;
use tracing::Instrument;

/// Connection configuration
///
/// Stores the target server, database name, credentials, and session
/// properties. Properties keep their insertion order and never hold duplicate
/// keys; the serialized property count always equals the number of entries.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Server hostname
    pub host: String,
    /// Server TCP port
    pub port: u16,
    /// Database name
    pub database: String,
    /// Username (upper-cased before it goes on the wire)
    pub user: String,
    /// Password (only the empty password is supported, see [`crate::auth`])
    pub password: String,
    /// Session properties, in insertion order
    pub properties: Vec<(String, String)>,
}

impl ConnectionConfig {
    /// Create new configuration with defaults
    ///
    /// # Arguments
    ///
    /// * `host` - Server hostname
    /// * `port` - Server TCP port
    /// * `database` - Database name
    pub fn new(host: impl Into<String>, port: u16, database: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            database: database.into(),
            user: String::new(),
            password: String::new(),
            properties: Vec::new(),
        }
    }

    /// Set username
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Set password
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Add a session property.
    ///
    /// Setting an existing key replaces its value in place instead of
    /// appending a duplicate entry.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.properties.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.properties.push((key, value));
        }
        self
    }
}

/// H2 remote session
///
/// Owns the socket and the [`Transfer`] framing it, with their lifetimes
/// coupled 1:1: the Transfer is constructed only once the socket is live and
/// both are released together. Drives the one-shot handshake and interprets
/// the server's terminal status.
#[derive(Debug)]
pub struct Connection {
    config: ConnectionConfig,
    user: String,
    user_password_hash: Vec<u8>,
    file_password_hash: Option<Vec<u8>>,
    transfer: Option<Transfer<TcpStream>>,
    state: ConnectionState,
}

impl Connection {
    /// Create a connection from configuration.
    ///
    /// The username is upper-cased and the credential hash is derived here,
    /// before any socket exists; unsupported credentials fail fast.
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        let user = config.user.to_uppercase();
        let user_password_hash = auth::hash_password(&user, &config.password)?;
        Ok(Self {
            user,
            user_password_hash,
            // Never populated; serialized as the null marker.
            file_password_hash: None,
            transfer: None,
            state: ConnectionState::Disconnected,
            config,
        })
    }

    /// Get current connection state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether the handshake completed and the session is live
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected && self.transfer.is_some()
    }

    /// The username as it goes on the wire (upper-cased)
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Open the socket and perform the handshake.
    ///
    /// All-or-nothing: on return the connection is either `Connected` with
    /// its socket and Transfer live, or `Closed` with both released. A
    /// server-initiated close (`STATUS_CLOSED`) is a graceful termination:
    /// the connection ends `Closed` but no error is returned.
    pub async fn connect(&mut self) -> Result<()> {
        let span = tracing::info_span!(
            "connect",
            host = %self.config.host,
            port = %self.config.port,
            database = %self.config.database
        );
        async {
            self.state.transition(ConnectionState::Connecting)?;
            crate::metrics::counters::connect_attempted();
            let start = std::time::Instant::now();

            tracing::debug!("connecting");
            let socket =
                match TcpStream::connect((self.config.host.as_str(), self.config.port)).await {
                    Ok(socket) => socket,
                    Err(e) => {
                        let _ = self.state.transition(ConnectionState::Closed);
                        crate::metrics::counters::connect_failed("io");
                        return Err(e.into());
                    }
                };

            tracing::debug!("initializing transfer");
            self.transfer = Some(Transfer::new(socket));

            match self.handshake().await {
                Ok(Status::Ok) | Ok(Status::OkStateChanged) => {
                    self.state.transition(ConnectionState::Connected)?;
                    crate::metrics::counters::connect_succeeded();
                    crate::metrics::histograms::handshake_duration(start.elapsed().as_millis() as u64);
                    tracing::info!("connected");
                    Ok(())
                }
                Ok(Status::Closed) => {
                    tracing::debug!("server closed the session during handshake");
                    crate::metrics::counters::session_closed_by_server();
                    self.release().await;
                    Ok(())
                }
                Ok(Status::Error(server)) => {
                    crate::metrics::counters::connect_failed("server_error");
                    self.release().await;
                    Err(Error::Database(server))
                }
                Ok(Status::Unrecognized(code)) => {
                    crate::metrics::counters::connect_failed("protocol_error");
                    self.release().await;
                    Err(Error::Internal(format!("unexpected status {}", code)))
                }
                Err(e) => {
                    crate::metrics::counters::connect_failed(failure_reason(&e));
                    self.release().await;
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Write the handshake fields in wire order, flush, and read the status.
    ///
    /// Field order is fixed by the server's read order; there is no
    /// negotiation of layout, only of the version numbers themselves.
    async fn handshake(&mut self) -> Result<Status> {
        let transfer = self.transfer.as_mut().expect("transfer not available");

        transfer.write_int(TCP_PROTOCOL_VERSION_MIN_SUPPORTED);
        transfer.write_int(TCP_PROTOCOL_VERSION_MAX_SUPPORTED);
        transfer.write_string(Some(&self.config.database));
        transfer.write_string(None); // originating URL
        transfer.write_string(Some(&self.user));
        transfer.write_bytes(Some(&self.user_password_hash));
        transfer.write_bytes(self.file_password_hash.as_deref());
        transfer.write_int(self.config.properties.len() as i32);
        for (key, value) in &self.config.properties {
            transfer.write_string(Some(key));
            transfer.write_string(Some(value));
        }

        transfer.flush().await?;
        Status::read_from(transfer).await
    }

    /// Close the connection.
    ///
    /// Releases the Transfer (which flushes and shuts its stream down), then
    /// transitions to `Closed`. Idempotent: a second call is a no-op and
    /// never errors.
    pub async fn close(&mut self) -> Result<()> {
        let result = match self.transfer.take() {
            Some(transfer) => {
                tracing::debug!("closing connection");
                transfer.close().await
            }
            None => Ok(()),
        };
        let _ = self.state.transition(ConnectionState::Closed);
        result
    }

    /// Release resources without surfacing close errors.
    ///
    /// Used on the failure paths of `connect` and on a server-initiated
    /// close, where an error from the flush or shutdown would mask the real
    /// outcome.
    async fn release(&mut self) {
        if let Some(transfer) = self.transfer.take() {
            if let Err(e) = transfer.close().await {
                tracing::debug!(error = %e, "error while releasing transfer");
            }
        }
        let _ = self.state.transition(ConnectionState::Closed);
    }

    /// Run `body` within the connection's lifetime.
    ///
    /// Connects first if not already connected, then closes unconditionally
    /// once the body returns, whether or not it failed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example() -> h2_wire::Result<()> {
    /// use h2_wire::{Connection, ConnectionConfig};
    ///
    /// let mut conn = Connection::new(ConnectionConfig::new("localhost", 9092, "test"))?;
    /// conn.session(|conn| {
    ///     Box::pin(async move {
    ///         assert!(conn.is_connected());
    ///         Ok(())
    ///     })
    /// })
    /// .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn session<T, F>(&mut self, body: F) -> Result<T>
    where
        F: for<'a> FnOnce(&'a mut Connection) -> BoxFuture<'a, Result<T>>,
    {
        if !self.is_connected() {
            self.connect().await?;
        }
        let result = body(self).await;
        let closed = self.close().await;
        let value = result?;
        closed?;
        Ok(value)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if self.transfer.is_some() {
            tracing::debug!("connection dropped without close; socket reclaimed unflushed");
        }
    }
}

fn failure_reason(err: &Error) -> &'static str {
    match err {
        Error::Io(_) => "io",
        Error::Database(_) => "server_error",
        Error::Internal(_) => "protocol_error",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_config() {
        let config = ConnectionConfig::new("localhost", 9092, "test")
            .user("sa")
            .password("")
            .property("CIPHER", "AES");

        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 9092);
        assert_eq!(config.database, "test");
        assert_eq!(config.user, "sa");
        assert_eq!(
            config.properties,
            vec![("CIPHER".to_string(), "AES".to_string())]
        );
    }

    #[test]
    fn test_property_replaces_duplicate_key() {
        let config = ConnectionConfig::new("localhost", 9092, "test")
            .property("KEY", "old")
            .property("OTHER", "x")
            .property("KEY", "new");

        assert_eq!(
            config.properties,
            vec![
                ("KEY".to_string(), "new".to_string()),
                ("OTHER".to_string(), "x".to_string()),
            ]
        );
    }

    #[test]
    fn test_new_uppercases_user() {
        let conn =
            Connection::new(ConnectionConfig::new("localhost", 9092, "test").user("sa")).unwrap();
        assert_eq!(conn.user(), "SA");
    }

    #[test]
    fn test_new_rejects_nonempty_password() {
        let result = Connection::new(
            ConnectionConfig::new("localhost", 9092, "test")
                .user("sa")
                .password("secret"),
        );
        assert!(matches!(result, Err(Error::Unsupported(_))));
    }

    #[test]
    fn test_new_connection_is_disconnected() {
        let conn = Connection::new(ConnectionConfig::new("localhost", 9092, "test")).unwrap();
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert!(!conn.is_connected());
    }
}

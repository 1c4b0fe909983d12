//! Client entry points
//!
//! Thin factories that build a [`Connection`] from target parameters, a full
//! configuration, or a connection string, and run the handshake.

mod connection_string;

pub use connection_string::ConnectionInfo;

use crate::connection::{Connection, ConnectionConfig};
use crate::Result;

/// Connect to a server with the given target parameters.
///
/// Uses an empty username and password; for credentials or session
/// properties, use [`connect_with_config`] or [`connect_url`].
pub async fn connect(
    host: impl Into<String>,
    port: u16,
    database: impl Into<String>,
) -> Result<Connection> {
    connect_with_config(ConnectionConfig::new(host, port, database)).await
}

/// Connect to a server with full configuration.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> h2_wire::Result<()> {
/// use h2_wire::ConnectionConfig;
///
/// let config = ConnectionConfig::new("localhost", 9092, "test")
///     .user("sa")
///     .property("CIPHER", "AES");
/// let mut conn = h2_wire::connect_with_config(config).await?;
/// conn.close().await?;
/// # Ok(())
/// # }
/// ```
pub async fn connect_with_config(config: ConnectionConfig) -> Result<Connection> {
    let mut conn = Connection::new(config)?;
    conn.connect().await?;
    Ok(conn)
}

/// Connect using a connection string.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> h2_wire::Result<()> {
/// let mut conn = h2_wire::connect_url("h2://localhost:9092/test?user=sa").await?;
/// conn.close().await?;
/// # Ok(())
/// # }
/// ```
pub async fn connect_url(url: &str) -> Result<Connection> {
    let info = ConnectionInfo::parse(url)?;
    connect_with_config(info.to_config()).await
}

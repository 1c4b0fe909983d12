//! Client-side handshake for the H2 database TCP server protocol
//!
//! Two layers, bottom-up:
//! * [`protocol::Transfer`]: a framed binary codec over one byte stream,
//!   with big-endian integers and UTF-16-code-unit length-prefixed strings,
//!   the framing the H2 server expects.
//! * [`Connection`]: owns a socket and its Transfer, drives the one-shot
//!   handshake (protocol version range, database, credentials, session
//!   properties) and interprets the server's terminal status.
//!
//! The protocol stops at handshake completion: no statements, result sets,
//! or transactions. All I/O is strictly sequential with no retries; any
//! transport or protocol error propagates after resources are released.
//!
//! # Example
//!
//! ```no_run
//! # async fn example() -> h2_wire::Result<()> {
//! let mut conn = h2_wire::connect("localhost", 9092, "test").await?;
//! assert!(conn.is_connected());
//! conn.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod connection;
pub mod error;
pub mod metrics;
pub mod protocol;

pub use client::{connect, connect_url, connect_with_config};
pub use connection::{Connection, ConnectionConfig, ConnectionState};
pub use error::{DatabaseError, Error, Result};

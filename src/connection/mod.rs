//! Connection management
//!
//! This module handles:
//! * Connection configuration
//! * Handshake lifecycle (connect, status interpretation, close)
//! * State machine enforcement

mod conn;
mod state;

pub use conn::{Connection, ConnectionConfig};
pub use state::ConnectionState;

//! Wire protocol layer
//!
//! This module handles:
//! * Primitive framing over a byte stream (`Transfer`)
//! * Protocol constants (status codes, version range)
//! * Status response decoding

pub mod constants;
mod status;
mod transfer;

pub use status::Status;
pub use transfer::Transfer;

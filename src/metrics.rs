//! Handshake metrics
//!
//! Thin wrappers over the `metrics` facade so every metric the crate records
//! is named in one place. Recording is a no-op unless the embedding
//! application installs a recorder.

/// Counter metrics
pub mod counters {
    /// A handshake attempt started
    pub fn connect_attempted() {
        metrics::counter!("h2_wire_connect_attempted_total").increment(1);
    }

    /// A handshake completed and the session is live
    pub fn connect_succeeded() {
        metrics::counter!("h2_wire_connect_succeeded_total").increment(1);
    }

    /// A handshake failed, labelled by failure class
    pub fn connect_failed(reason: &str) {
        metrics::counter!("h2_wire_connect_failed_total", "reason" => reason.to_string())
            .increment(1);
    }

    /// The server closed the session during the handshake
    pub fn session_closed_by_server() {
        metrics::counter!("h2_wire_session_closed_by_server_total").increment(1);
    }
}

/// Histogram metrics
pub mod histograms {
    /// Wall-clock duration of a successful handshake, in milliseconds
    pub fn handshake_duration(millis: u64) {
        metrics::histogram!("h2_wire_handshake_duration_ms").record(millis as f64);
    }
}

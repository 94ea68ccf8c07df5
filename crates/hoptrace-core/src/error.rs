//! Error types for traceroute operations.

use crate::AddressFamily;
use thiserror::Error;

/// Main error type for traceroute operations.
#[derive(Error, Debug)]
pub enum TraceError {
    // Input errors
    #[error("Invalid destination address: {0:?} is neither an IPv4 nor an IPv6 literal")]
    InvalidAddress(String),

    #[error("Invalid max ttl: {max_ttl}")]
    InvalidConfig { max_ttl: i32 },

    // Socket errors
    #[error("Failed to acquire {family} socket: {source}")]
    SocketUnavailable {
        family: AddressFamily,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to set socket option {option}: {source}")]
    SocketOption {
        option: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to send probe to port {port}: {source}")]
    SendFailed {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("Receive timeout exceeded")]
    ReceiveTimeout,

    #[error("Receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    // Packet errors
    #[error("Packet too short: expected at least {expected} bytes, got {actual}")]
    PacketTooShort { expected: usize, actual: usize },

    #[error("Malformed {layer} packet: {reason}")]
    MalformedPacket { layer: &'static str, reason: String },
}

impl TraceError {
    /// Returns true if this error means "no answer" rather than a failure.
    ///
    /// The probe loop records these as non-responded hops and applies its
    /// retry policy. Anything else returned by a driver ends the trace.
    /// Malformed reply bytes are not in this set.
    pub fn is_non_response(&self) -> bool {
        matches!(self, Self::ReceiveTimeout | Self::ReceiveFailed(_))
    }
}

impl From<std::io::Error> for TraceError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut => TraceError::ReceiveTimeout,
            std::io::ErrorKind::WouldBlock => TraceError::ReceiveTimeout,
            _ => TraceError::ReceiveFailed(err),
        }
    }
}

/// Result type alias for traceroute operations.
pub type TraceResultOf<T> = Result<T, TraceError>;

//! Address family classification.

use crate::TraceError;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// The address family a trace runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    /// Returns the family of an already parsed address.
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => AddressFamily::V4,
            IpAddr::V6(_) => AddressFamily::V6,
        }
    }
}

impl std::fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressFamily::V4 => write!(f, "IPv4"),
            AddressFamily::V6 => write!(f, "IPv6"),
        }
    }
}

/// Parses a literal destination address.
///
/// No name resolution happens here; hostnames are rejected with
/// [`TraceError::InvalidAddress`]. IPv4-mapped IPv6 literals such as
/// `::ffff:192.0.2.1` stay on the IPv6 path.
pub fn classify(destination: &str) -> Result<IpAddr, TraceError> {
    destination
        .parse::<IpAddr>()
        .map_err(|_| TraceError::InvalidAddress(destination.to_string()))
}

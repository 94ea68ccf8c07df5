//! Core types exchanged between a driver and the probe loop.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Meaning of a decoded ICMP or ICMPv6 reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    /// A router on the path dropped the probe because its TTL ran out.
    TimeExceeded,
    /// The probe arrived somewhere that could not deliver it to the UDP port.
    DestinationUnreachable,
    /// Any other control message. Informational only.
    Other { icmp_type: u8, code: u8 },
}

impl std::fmt::Display for ReplyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplyKind::TimeExceeded => write!(f, "time exceeded"),
            ReplyKind::DestinationUnreachable => write!(f, "destination unreachable"),
            ReplyKind::Other { icmp_type, code } => write!(f, "type {} code {}", icmp_type, code),
        }
    }
}

/// A reply read from the receive socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeReply {
    /// Address the reply came from.
    pub from: IpAddr,
    /// Decoded message kind.
    pub kind: ReplyKind,
}

impl ProbeReply {
    pub fn new(from: IpAddr, kind: ReplyKind) -> Self {
        Self { from, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_kind_display() {
        assert_eq!(ReplyKind::TimeExceeded.to_string(), "time exceeded");
        assert_eq!(
            ReplyKind::DestinationUnreachable.to_string(),
            "destination unreachable"
        );
        assert_eq!(
            ReplyKind::Other {
                icmp_type: 0,
                code: 0
            }
            .to_string(),
            "type 0 code 0"
        );
    }
}

//! Per-family probe details.
//!
//! The IPv4 and IPv6 traces run the same loop; they differ only in how the
//! hop limit is set on the send socket, what the probe carries and how a
//! reply buffer is read. [`ProbeFamily`] holds those three pieces.

use hoptrace_core::{AddressFamily, ReplyKind, TraceError};
use hoptrace_packets::{decode_icmpv4, decode_icmpv6};
use socket2::Socket;
use std::net::IpAddr;

/// Payload of an IPv4 probe.
pub const V4_PROBE_PAYLOAD: &[u8] = &[0];

/// Payload of an IPv6 probe.
pub const V6_PROBE_PAYLOAD: &[u8] = b"hello";

/// Probe behaviour selected by the destination's address family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeFamily {
    V4,
    V6,
}

impl ProbeFamily {
    pub fn for_destination(destination: &IpAddr) -> Self {
        match AddressFamily::of(destination) {
            AddressFamily::V4 => ProbeFamily::V4,
            AddressFamily::V6 => ProbeFamily::V6,
        }
    }

    pub fn address_family(self) -> AddressFamily {
        match self {
            ProbeFamily::V4 => AddressFamily::V4,
            ProbeFamily::V6 => AddressFamily::V6,
        }
    }

    /// Sets the outgoing TTL (IPv4) or unicast hop limit (IPv6).
    pub fn apply_send_options(self, socket: &Socket, ttl: u8) -> Result<(), TraceError> {
        match self {
            ProbeFamily::V4 => socket
                .set_ttl(u32::from(ttl))
                .map_err(|source| TraceError::SocketOption {
                    option: "IP_TTL",
                    source,
                }),
            ProbeFamily::V6 => socket
                .set_unicast_hops_v6(u32::from(ttl))
                .map_err(|source| TraceError::SocketOption {
                    option: "IPV6_UNICAST_HOPS",
                    source,
                }),
        }
    }

    pub fn probe_payload(self) -> &'static [u8] {
        match self {
            ProbeFamily::V4 => V4_PROBE_PAYLOAD,
            ProbeFamily::V6 => V6_PROBE_PAYLOAD,
        }
    }

    /// Decodes what the raw receive socket returned.
    ///
    /// IPv4 buffers start with the IP header, IPv6 buffers with the ICMPv6
    /// message.
    pub fn parse_reply(self, buf: &[u8]) -> Result<ReplyKind, TraceError> {
        match self {
            ProbeFamily::V4 => decode_icmpv4(buf),
            ProbeFamily::V6 => decode_icmpv6(buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pnet_packet::icmp::{IcmpTypes, MutableIcmpPacket};
    use pnet_packet::icmpv6::{Icmpv6Types, MutableIcmpv6Packet};
    use pnet_packet::ip::IpNextHeaderProtocols;
    use pnet_packet::ipv4::MutableIpv4Packet;
    use socket2::{Domain, Protocol, Type};
    use std::net::Ipv4Addr;

    fn icmpv4_time_exceeded_datagram() -> Vec<u8> {
        let mut icmp = vec![0u8; 36];
        MutableIcmpPacket::new(&mut icmp)
            .unwrap()
            .set_icmp_type(IcmpTypes::TimeExceeded);

        let mut buf = vec![0u8; 20 + icmp.len()];
        let mut ip = MutableIpv4Packet::new(&mut buf).unwrap();
        ip.set_version(4);
        ip.set_header_length(5);
        ip.set_total_length((20 + icmp.len()) as u16);
        ip.set_next_level_protocol(IpNextHeaderProtocols::Icmp);
        ip.set_source(Ipv4Addr::new(10, 0, 0, 1));
        ip.set_destination(Ipv4Addr::new(10, 0, 0, 2));
        ip.set_payload(&icmp);
        buf
    }

    #[test]
    fn test_for_destination() {
        let v4: IpAddr = "192.0.2.1".parse().unwrap();
        let v6: IpAddr = "2001:db8::1".parse().unwrap();
        assert_eq!(ProbeFamily::for_destination(&v4), ProbeFamily::V4);
        assert_eq!(ProbeFamily::for_destination(&v6), ProbeFamily::V6);
        assert_eq!(ProbeFamily::V6.address_family(), AddressFamily::V6);
    }

    #[test]
    fn test_payloads() {
        assert_eq!(ProbeFamily::V4.probe_payload(), &[0u8]);
        assert_eq!(ProbeFamily::V6.probe_payload(), b"hello");
    }

    #[test]
    fn test_v4_reply_has_ip_header_stripped() {
        let datagram = icmpv4_time_exceeded_datagram();
        assert_eq!(
            ProbeFamily::V4.parse_reply(&datagram).unwrap(),
            ReplyKind::TimeExceeded
        );
        // The same bytes read as ICMPv6 are type 0x45, not an error kind.
        assert!(matches!(
            ProbeFamily::V6.parse_reply(&datagram).unwrap(),
            ReplyKind::Other { icmp_type: 0x45, .. }
        ));
    }

    #[test]
    fn test_v6_reply_is_read_directly() {
        let mut buf = vec![0u8; 48];
        MutableIcmpv6Packet::new(&mut buf)
            .unwrap()
            .set_icmpv6_type(Icmpv6Types::DestinationUnreachable);
        assert_eq!(
            ProbeFamily::V6.parse_reply(&buf).unwrap(),
            ReplyKind::DestinationUnreachable
        );
        // A leading type byte of 1 leaves a version nibble of 0, not IPv4.
        assert!(ProbeFamily::V4.parse_reply(&buf).is_err());
    }

    #[test]
    fn test_apply_send_options_v4() {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP)).unwrap();
        ProbeFamily::V4.apply_send_options(&socket, 7).unwrap();
        assert_eq!(socket.ttl().unwrap(), 7);
        ProbeFamily::V4.apply_send_options(&socket, 64).unwrap();
        assert_eq!(socket.ttl().unwrap(), 64);
    }

    #[test]
    fn test_apply_send_options_v6() {
        // Hosts without IPv6 support can't create the socket at all.
        let Ok(socket) = Socket::new(Domain::IPV6, Type::DGRAM, Some(Protocol::UDP)) else {
            return;
        };
        ProbeFamily::V6.apply_send_options(&socket, 12).unwrap();
        assert_eq!(socket.unicast_hops_v6().unwrap(), 12);
    }
}

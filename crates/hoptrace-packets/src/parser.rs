//! ICMP reply decoding using etherparse.
//!
//! Raw ICMPv4 sockets hand back the whole IP datagram, so the IPv4 path
//! strips the header using its own IHL field before looking at the ICMP
//! message. Raw ICMPv6 sockets deliver the ICMPv6 message directly.
//!
//! Only the message type is looked at. The quoted original datagram inside
//! an error message is not matched against the probe that was sent, so a
//! late or stray reply is attributed to whatever probe is current.

use etherparse::{icmpv4, icmpv6, Icmpv4Slice, Icmpv6Slice, Ipv4HeaderSlice};
use hoptrace_core::{ReplyKind, TraceError};

/// Smallest ICMP / ICMPv6 message: type, code, checksum and 4 bytes of body.
pub const MIN_ICMP_LEN: usize = 8;

/// Returns the part of an IPv4 datagram that follows its header.
pub fn strip_ipv4_header(packet: &[u8]) -> Result<&[u8], TraceError> {
    let header = Ipv4HeaderSlice::from_slice(packet).map_err(|e| TraceError::MalformedPacket {
        layer: "IPv4",
        reason: e.to_string(),
    })?;
    Ok(&packet[header.slice().len()..])
}

/// Decodes an IPv4 datagram carrying an ICMP message.
pub fn decode_icmpv4(packet: &[u8]) -> Result<ReplyKind, TraceError> {
    let message = strip_ipv4_header(packet)?;
    check_len(message)?;

    let icmp = Icmpv4Slice::from_slice(message).map_err(|e| TraceError::MalformedPacket {
        layer: "ICMP",
        reason: e.to_string(),
    })?;

    Ok(match icmp.type_u8() {
        icmpv4::TYPE_TIME_EXCEEDED => ReplyKind::TimeExceeded,
        icmpv4::TYPE_DEST_UNREACH => ReplyKind::DestinationUnreachable,
        icmp_type => ReplyKind::Other {
            icmp_type,
            code: icmp.code_u8(),
        },
    })
}

/// Decodes an ICMPv6 message as delivered by a raw ICMPv6 socket.
pub fn decode_icmpv6(message: &[u8]) -> Result<ReplyKind, TraceError> {
    check_len(message)?;

    let icmp = Icmpv6Slice::from_slice(message).map_err(|e| TraceError::MalformedPacket {
        layer: "ICMPv6",
        reason: e.to_string(),
    })?;

    Ok(match icmp.type_u8() {
        icmpv6::TYPE_TIME_EXCEEDED => ReplyKind::TimeExceeded,
        icmpv6::TYPE_DST_UNREACH => ReplyKind::DestinationUnreachable,
        icmp_type => ReplyKind::Other {
            icmp_type,
            code: icmp.code_u8(),
        },
    })
}

fn check_len(message: &[u8]) -> Result<(), TraceError> {
    if message.len() < MIN_ICMP_LEN {
        return Err(TraceError::PacketTooShort {
            expected: MIN_ICMP_LEN,
            actual: message.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pnet_packet::icmp::{self, IcmpCode, IcmpType, IcmpTypes, MutableIcmpPacket};
    use pnet_packet::icmpv6::{Icmpv6Code, Icmpv6Type, Icmpv6Types, MutableIcmpv6Packet};
    use pnet_packet::ip::IpNextHeaderProtocols;
    use pnet_packet::ipv4::{self, MutableIpv4Packet};
    use std::net::Ipv4Addr;

    /// First 28 bytes of a quoted probe: a 20 byte IPv4 header and the UDP header.
    const QUOTED: [u8; 28] = [0u8; 28];

    fn build_icmpv4(icmp_type: IcmpType, code: u8) -> Vec<u8> {
        let mut buf = vec![0u8; 8 + QUOTED.len()];
        let mut packet = MutableIcmpPacket::new(&mut buf).unwrap();
        packet.set_icmp_type(icmp_type);
        packet.set_icmp_code(IcmpCode::new(code));
        packet.set_payload(&[[0u8; 4].as_slice(), QUOTED.as_slice()].concat());
        let checksum = icmp::checksum(&packet.to_immutable());
        packet.set_checksum(checksum);
        buf
    }

    fn build_ipv4(header_words: u8, payload: &[u8]) -> Vec<u8> {
        let header_len = header_words as usize * 4;
        let mut buf = vec![0u8; header_len + payload.len()];
        let mut packet = MutableIpv4Packet::new(&mut buf).unwrap();
        packet.set_version(4);
        packet.set_header_length(header_words);
        packet.set_total_length((header_len + payload.len()) as u16);
        packet.set_ttl(250);
        packet.set_next_level_protocol(IpNextHeaderProtocols::Icmp);
        packet.set_source(Ipv4Addr::new(10, 0, 0, 1));
        packet.set_destination(Ipv4Addr::new(192, 168, 1, 10));
        packet.set_payload(payload);
        let checksum = ipv4::checksum(&packet.to_immutable());
        packet.set_checksum(checksum);
        buf
    }

    fn build_icmpv6(icmp_type: Icmpv6Type, code: u8) -> Vec<u8> {
        let mut buf = vec![0u8; 8 + 48];
        let mut packet = MutableIcmpv6Packet::new(&mut buf).unwrap();
        packet.set_icmpv6_type(icmp_type);
        packet.set_icmpv6_code(Icmpv6Code::new(code));
        buf
    }

    #[test]
    fn test_decode_icmpv4_time_exceeded() {
        let packet = build_ipv4(5, &build_icmpv4(IcmpTypes::TimeExceeded, 0));
        assert_eq!(decode_icmpv4(&packet).unwrap(), ReplyKind::TimeExceeded);
    }

    #[test]
    fn test_decode_icmpv4_destination_unreachable() {
        for code in [0, 1, 3, 13] {
            let packet = build_ipv4(5, &build_icmpv4(IcmpTypes::DestinationUnreachable, code));
            assert_eq!(
                decode_icmpv4(&packet).unwrap(),
                ReplyKind::DestinationUnreachable
            );
        }
    }

    #[test]
    fn test_decode_icmpv4_other() {
        let packet = build_ipv4(5, &build_icmpv4(IcmpTypes::EchoReply, 0));
        assert_eq!(
            decode_icmpv4(&packet).unwrap(),
            ReplyKind::Other {
                icmp_type: 0,
                code: 0
            }
        );
    }

    #[test]
    fn test_ipv4_header_with_options_is_stripped() {
        let icmp = build_icmpv4(IcmpTypes::TimeExceeded, 1);
        let packet = build_ipv4(6, &icmp);
        assert_eq!(packet.len(), 24 + icmp.len());
        assert_eq!(strip_ipv4_header(&packet).unwrap(), icmp.as_slice());
        assert_eq!(decode_icmpv4(&packet).unwrap(), ReplyKind::TimeExceeded);
    }

    #[test]
    fn test_decode_icmpv4_malformed() {
        // Shorter than a minimal IPv4 header.
        assert!(matches!(
            decode_icmpv4(&[0x45, 0, 0, 20]),
            Err(TraceError::MalformedPacket { layer: "IPv4", .. })
        ));

        // Declared header length past the end of the buffer.
        let mut packet = build_ipv4(5, &build_icmpv4(IcmpTypes::TimeExceeded, 0));
        packet[0] = 0x4f;
        packet.truncate(40);
        assert!(matches!(
            decode_icmpv4(&packet),
            Err(TraceError::MalformedPacket { layer: "IPv4", .. })
        ));

        // Not IPv4 at all.
        let mut packet = build_ipv4(5, &build_icmpv4(IcmpTypes::TimeExceeded, 0));
        packet[0] = 0x65;
        assert!(decode_icmpv4(&packet).is_err());

        // Header fine, ICMP message truncated.
        let packet = build_ipv4(5, &[11, 0, 0]);
        assert!(matches!(
            decode_icmpv4(&packet),
            Err(TraceError::PacketTooShort {
                expected: 8,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_decode_icmpv6() {
        assert_eq!(
            decode_icmpv6(&build_icmpv6(Icmpv6Types::TimeExceeded, 0)).unwrap(),
            ReplyKind::TimeExceeded
        );
        assert_eq!(
            decode_icmpv6(&build_icmpv6(Icmpv6Types::DestinationUnreachable, 4)).unwrap(),
            ReplyKind::DestinationUnreachable
        );
        assert_eq!(
            decode_icmpv6(&build_icmpv6(Icmpv6Types::EchoReply, 0)).unwrap(),
            ReplyKind::Other {
                icmp_type: 129,
                code: 0
            }
        );
    }

    #[test]
    fn test_decode_icmpv6_is_not_stripped() {
        // A buffer that starts like an IPv6 header is read as ICMPv6 type 0x60.
        let mut buf = build_icmpv6(Icmpv6Types::TimeExceeded, 0);
        buf[0] = 0x60;
        assert_eq!(
            decode_icmpv6(&buf).unwrap(),
            ReplyKind::Other {
                icmp_type: 0x60,
                code: 0
            }
        );
    }

    #[test]
    fn test_decode_icmpv6_too_short() {
        assert!(matches!(
            decode_icmpv6(&[3, 0, 0, 0]),
            Err(TraceError::PacketTooShort {
                expected: 8,
                actual: 4
            })
        ));
    }
}

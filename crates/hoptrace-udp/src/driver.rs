//! UDP traceroute driver implementation.

use crate::packet::ProbeFamily;
use hoptrace_core::{ProbeReply, TraceError, TracerouteDriver};
use hoptrace_packets::{SocketPair, RECV_BUFFER_LEN};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tracing::trace;

/// UDP traceroute driver.
///
/// Sends UDP datagrams with an increasing TTL and reads the ICMP errors they
/// provoke from a raw socket. Owns its socket pair for its whole lifetime.
pub struct UdpDriver {
    /// Per-family probe behaviour.
    family: ProbeFamily,
    /// Target IP address.
    target_ip: IpAddr,
    /// Send and receive sockets.
    sockets: SocketPair,
    /// Read buffer.
    buffer: Vec<u8>,
}

impl UdpDriver {
    /// Opens the socket pair for `target_ip` with a receive timeout of `wait`.
    pub fn open(target_ip: IpAddr, wait: Duration) -> Result<Self, TraceError> {
        let family = ProbeFamily::for_destination(&target_ip);
        let sockets = SocketPair::open(family.address_family(), wait)?;

        Ok(Self {
            family,
            target_ip,
            sockets,
            buffer: vec![0u8; RECV_BUFFER_LEN],
        })
    }
}

impl TracerouteDriver for UdpDriver {
    fn destination(&self) -> IpAddr {
        self.target_ip
    }

    fn send_probe(&mut self, ttl: u8, port: u16) -> Result<(), TraceError> {
        self.family.apply_send_options(self.sockets.sender(), ttl)?;

        let payload = self.family.probe_payload();
        trace!(ttl, port, len = payload.len(), "Sending UDP probe");

        self.sockets
            .send_to(payload, SocketAddr::new(self.target_ip, port))
    }

    fn receive_probe(&mut self) -> Result<Option<ProbeReply>, TraceError> {
        let (n, from) = match self.sockets.recv_from(&mut self.buffer) {
            Ok(received) => received,
            Err(e) => {
                return match TraceError::from(e) {
                    TraceError::ReceiveTimeout => Ok(None),
                    other => Err(other),
                };
            }
        };

        let kind = self.family.parse_reply(&self.buffer[..n])?;
        trace!(from = %from, len = n, kind = %kind, "Received reply");

        Ok(Some(ProbeReply::new(from, kind)))
    }
}

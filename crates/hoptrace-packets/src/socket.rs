//! The send / receive socket pair owned by one trace.

use hoptrace_core::{AddressFamily, TraceError};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io;
use std::mem::MaybeUninit;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tracing::trace;

/// Receive buffer size for replies.
pub const RECV_BUFFER_LEN: usize = 4096;

/// A UDP send socket and a raw ICMP (or ICMPv6) receive socket.
///
/// Both sockets are closed when the pair is dropped, on every exit path of
/// the trace that owns it. The pair is never shared between traces.
pub struct SocketPair {
    family: AddressFamily,
    send: Socket,
    recv: Socket,
}

impl SocketPair {
    /// Opens both sockets and sets the receive timeout to `wait`.
    ///
    /// The raw receive socket usually needs root or `CAP_NET_RAW`; if either
    /// socket can't be created the error is [`TraceError::SocketUnavailable`].
    pub fn open(family: AddressFamily, wait: Duration) -> Result<Self, TraceError> {
        let (domain, control) = match family {
            AddressFamily::V4 => (Domain::IPV4, Protocol::ICMPV4),
            AddressFamily::V6 => (Domain::IPV6, Protocol::ICMPV6),
        };
        let unavailable = |source| TraceError::SocketUnavailable { family, source };

        let send = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP)).map_err(unavailable)?;
        let recv = Socket::new(domain, Type::RAW, Some(control)).map_err(unavailable)?;

        recv.set_read_timeout(Some(wait))
            .map_err(|source| TraceError::SocketOption {
                option: "SO_RCVTIMEO",
                source,
            })?;

        trace!(%family, wait_secs = wait.as_secs(), "Opened socket pair");

        Ok(Self { family, send, recv })
    }

    pub fn family(&self) -> AddressFamily {
        self.family
    }

    /// The UDP socket probes go out on, for per-probe options.
    pub fn sender(&self) -> &Socket {
        &self.send
    }

    /// Sends one datagram. Failures here end the trace.
    pub fn send_to(&self, payload: &[u8], target: SocketAddr) -> Result<(), TraceError> {
        self.send
            .send_to(payload, &SockAddr::from(target))
            .map(|_| ())
            .map_err(|source| TraceError::SendFailed {
                port: target.port(),
                source,
            })
    }

    /// Blocks until a reply arrives or the receive timeout passes.
    ///
    /// Returns the number of bytes read and the sender's address. A timeout
    /// surfaces as `WouldBlock` or `TimedOut` depending on the platform.
    pub fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, IpAddr)> {
        // SAFETY: `u8` and `MaybeUninit<u8>` have the same layout, and
        // recv_from only writes initialized bytes into the buffer.
        let uninit = unsafe { &mut *(buf as *mut [u8] as *mut [MaybeUninit<u8>]) };
        let (n, from) = self.recv.recv_from(uninit)?;
        let from = from
            .as_socket()
            .map(|addr| addr.ip())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "reply from non-IP address"))?;
        Ok((n, from))
    }
}

//! Core trait for per-family probe implementations.

use crate::{ProbeReply, TraceError};
use std::net::IpAddr;

/// The capability set the probe loop drives.
///
/// An implementation owns whatever sockets it needs for one trace and knows
/// how to put a probe on the wire with a given TTL and how to turn raw
/// reply bytes into a [`ProbeReply`]. The loop itself never touches a socket,
/// which lets tests substitute a scripted driver.
pub trait TracerouteDriver {
    /// The address being traced.
    fn destination(&self) -> IpAddr;

    /// Sends one probe with the given TTL (hop limit) to `port`.
    ///
    /// Any error here is fatal to the trace.
    fn send_probe(&mut self, ttl: u8, port: u16) -> Result<(), TraceError>;

    /// Waits up to the configured receive timeout for one reply.
    ///
    /// Returns `Ok(None)` if nothing arrived in time. Errors for which
    /// [`TraceError::is_non_response`] holds are treated like a timeout;
    /// every other error stops the trace.
    fn receive_probe(&mut self) -> Result<Option<ProbeReply>, TraceError>;
}

//! UDP traceroute implementation.
//!
//! [`trace`] is the entry point: it picks the IPv4 or IPv6 path from the
//! destination literal, opens a socket pair for the duration of the call and
//! runs the serial probe loop over it.

mod driver;
mod packet;

pub use driver::UdpDriver;
pub use packet::{ProbeFamily, V4_PROBE_PAYLOAD, V6_PROBE_PAYLOAD};

use hoptrace_core::execution::traceroute_serial;
use hoptrace_core::{classify, TraceConfig, TraceError, TraceResult};
use tracing::debug;

/// Traces the path to `destination`, a literal IPv4 or IPv6 address.
///
/// With `config` unset the defaults of [`TraceConfig::default`] apply. The
/// sockets are released before this returns, whatever the outcome.
///
/// # Errors
///
/// Fails without a partial result on an unparseable address, a max TTL of
/// zero or less, missing raw socket privilege, a send error or a reply that
/// can't be decoded. Timeouts are not errors; they show up as hops that did
/// not respond.
pub fn trace(destination: &str, config: Option<&TraceConfig>) -> Result<TraceResult, TraceError> {
    let target_ip = classify(destination)?;
    let config = config.cloned().unwrap_or_default().validate()?;

    debug!(
        destination = %target_ip,
        first_ttl = config.first_ttl,
        max_ttl = config.max_ttl,
        retry = config.retry,
        wait_secs = config.wait_secs,
        "Starting trace"
    );

    let mut driver = UdpDriver::open(target_ip, config.wait())?;
    traceroute_serial(&mut driver, &config)
}

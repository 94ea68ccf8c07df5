//! Turns a command line target into a finished trace report.

use hickory_resolver::{ResolveError, TokioResolver};
use hoptrace_core::{HopRecord, TraceConfig, TraceError};
use serde::Serialize;
use std::fmt::Write as _;
use std::net::IpAddr;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{debug, info};

/// Address family requested with `-4` / `-6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preference {
    V4,
    V6,
}

impl Preference {
    fn matches(self, ip: &IpAddr) -> bool {
        match self {
            Preference::V4 => ip.is_ipv4(),
            Preference::V6 => ip.is_ipv6(),
        }
    }
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("No host in target {0:?}")]
    EmptyTarget(String),

    #[error("Failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: ResolveError,
    },

    #[error("No addresses found for {0:?}")]
    NoAddress(String),

    #[error(transparent)]
    Trace(#[from] TraceError),

    #[error("Trace task did not complete: {0}")]
    Join(#[from] JoinError),
}

/// What the user asked for.
#[derive(Debug, Clone)]
pub struct TraceRequest {
    pub target: String,
    pub config: TraceConfig,
    pub prefer: Option<Preference>,
}

/// Output of one run, as printed.
#[derive(Debug, Serialize)]
pub struct TraceReport {
    pub destination: IpAddr,
    pub host: String,
    pub config: TraceConfig,
    pub reached: bool,
    pub hops: Vec<HopRecord>,
}

impl TraceReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// One line per hop followed by a summary line.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "traceroute to {} ({}), {} hops max",
            self.host, self.destination, self.config.max_ttl
        );
        for hop in &self.hops {
            let _ = writeln!(
                out,
                "{:>3}  {:<39}  {:.3} ms",
                hop.ttl,
                hop.responder_text(),
                hop.elapsed.as_secs_f64() * 1000.0
            );
        }
        if self.reached {
            let _ = writeln!(out, "reached {} in {} probes", self.destination, self.hops.len());
        } else {
            let _ = writeln!(
                out,
                "{} not reached within {} hops",
                self.destination, self.config.max_ttl
            );
        }
        out
    }
}

/// Extracts the host from a URL or `host[:port]` string.
///
/// Returns the host and the port if one was given. Bare IPv6 literals are
/// returned whole; an IPv6 address with a port must be bracketed.
pub fn host_from_target(target: &str) -> (&str, Option<u16>) {
    let rest = target.trim();
    let rest = match rest.find("://") {
        Some(i) => &rest[i + 3..],
        None => rest,
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    // Drop userinfo.
    let authority = authority.rsplit('@').next().unwrap_or_default();

    if let Some(bracketed) = authority.strip_prefix('[') {
        return match bracketed.split_once(']') {
            Some((host, tail)) => (host, tail.strip_prefix(':').and_then(|p| p.parse().ok())),
            None => (bracketed, None),
        };
    }

    match authority.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') => (host, port.parse().ok()),
        _ => (authority, None),
    }
}

/// Picks the address to trace for `host`.
///
/// Literals are used as they are. Names go through the system resolver; the
/// first answer in the preferred family wins, or the first answer overall.
pub async fn resolve_host(host: &str, prefer: Option<Preference>) -> Result<IpAddr, RunError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    let resolve_err = |source| RunError::Resolve {
        host: host.to_string(),
        source,
    };
    let resolver = TokioResolver::builder_tokio().map_err(resolve_err)?.build();
    let lookup = resolver.lookup_ip(host).await.map_err(resolve_err)?;

    let addrs: Vec<IpAddr> = lookup.iter().collect();
    pick_address(&addrs, prefer).ok_or_else(|| RunError::NoAddress(host.to_string()))
}

fn pick_address(addrs: &[IpAddr], prefer: Option<Preference>) -> Option<IpAddr> {
    match prefer {
        Some(p) => addrs.iter().find(|ip| p.matches(ip)).copied(),
        None => addrs.first().copied(),
    }
}

/// Resolves the target and runs the blocking trace off the async runtime.
pub async fn run_trace(request: TraceRequest) -> Result<TraceReport, RunError> {
    // Fail on a bad max TTL before touching DNS.
    let config = request.config.validate()?;

    let (host, port) = host_from_target(&request.target);
    if host.is_empty() {
        return Err(RunError::EmptyTarget(request.target.clone()));
    }
    if let Some(port) = port {
        debug!(port, "Ignoring port in target");
    }

    let destination = resolve_host(host, request.prefer).await?;
    info!(host, destination = %destination, "Starting traceroute");

    let trace_config = config.clone();
    let result = tokio::task::spawn_blocking(move || {
        hoptrace_udp::trace(&destination.to_string(), Some(&trace_config))
    })
    .await??;

    let reached = result.reached(destination);
    info!(hops = result.len(), reached, "Traceroute complete");

    Ok(TraceReport {
        destination,
        host: host.to_string(),
        config,
        reached,
        hops: result.into_hops(),
    })
}

//! Core types, traits, and error handling for hoptrace.
//!
//! This crate provides the socket-free half of the traceroute engine:
//!
//! - [`TraceConfig`] and its normalizing [`TraceConfig::validate`]
//! - [`HopRecord`] and the append-only [`TraceResult`]
//! - [`classify`] for selecting the IPv4 or IPv6 code path
//! - [`TracerouteDriver`], the seam a per-family probe implementation plugs into
//! - [`execution::traceroute_serial`], the TTL sweeping probe loop
//! - [`TraceError`] for error handling

pub mod config;
pub mod error;
pub mod execution;
pub mod family;
pub mod result;
pub mod traits;
pub mod types;

pub use config::{
    TraceConfig, DEFAULT_FIRST_TTL, DEFAULT_MAX_TTL, DEST_MAX_PORT, DEST_MIN_PORT, MAX_TTL_LIMIT,
    MAX_WAIT_SECS, MIN_WAIT_SECS,
};
pub use error::{TraceError, TraceResultOf};
pub use family::{classify, AddressFamily};
pub use result::{HopRecord, TraceResult, NO_REPLY};
pub use traits::TracerouteDriver;
pub use types::{ProbeReply, ReplyKind};

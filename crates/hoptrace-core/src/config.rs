//! Trace configuration and its normalization.

use crate::TraceError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// First TTL used when none (or a non-positive one) is given.
pub const DEFAULT_FIRST_TTL: i32 = 1;
/// Max TTL used by [`TraceConfig::default`].
pub const DEFAULT_MAX_TTL: i32 = 30;
/// Hard upper bound for the max TTL.
pub const MAX_TTL_LIMIT: i32 = 64;
/// Lower bound of the receive wait, in seconds.
pub const MIN_WAIT_SECS: i64 = 1;
/// Upper bound of the receive wait, in seconds.
pub const MAX_WAIT_SECS: i64 = 10;
/// First destination port of the rotating probe range.
pub const DEST_MIN_PORT: u16 = 33434;
/// Last destination port of the rotating probe range.
pub const DEST_MAX_PORT: u16 = 33534;

/// Parameters of a single trace.
///
/// Values are plain signed integers so that callers can hand over whatever
/// they parsed; [`TraceConfig::validate`] turns them into a usable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Hop count of the first probe.
    pub first_ttl: i32,
    /// Largest hop count probed, clamped to [`MAX_TTL_LIMIT`].
    pub max_ttl: i32,
    /// Extra attempts per TTL before moving on.
    pub retry: i32,
    /// Receive timeout per probe, clamped to [`MIN_WAIT_SECS`]..=[`MAX_WAIT_SECS`].
    pub wait_secs: i64,
    /// Emit per-hop progress at info level.
    pub debug: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            first_ttl: DEFAULT_FIRST_TTL,
            max_ttl: DEFAULT_MAX_TTL,
            retry: 0,
            wait_secs: MIN_WAIT_SECS,
            debug: false,
        }
    }
}

impl TraceConfig {
    /// Normalizes the configuration.
    ///
    /// Only a non-positive max TTL is rejected. Everything else is pulled
    /// into range: the first TTL is reset to 1 when non-positive and lowered
    /// to the max TTL when above it, the max TTL is clamped to 64, the wait
    /// is clamped to 1..=10 seconds and a negative retry budget becomes 0.
    pub fn validate(&self) -> Result<TraceConfig, TraceError> {
        if self.max_ttl <= 0 {
            return Err(TraceError::InvalidConfig {
                max_ttl: self.max_ttl,
            });
        }

        let max_ttl = self.max_ttl.min(MAX_TTL_LIMIT);

        let mut first_ttl = self.first_ttl;
        if first_ttl <= 0 {
            first_ttl = DEFAULT_FIRST_TTL;
        }
        let first_ttl = first_ttl.min(max_ttl);

        Ok(TraceConfig {
            first_ttl,
            max_ttl,
            retry: self.retry.max(0),
            wait_secs: self.wait_secs.clamp(MIN_WAIT_SECS, MAX_WAIT_SECS),
            debug: self.debug,
        })
    }

    /// First TTL as a hop count. Only meaningful on a validated config.
    pub fn first_hop(&self) -> u8 {
        self.first_ttl.clamp(1, MAX_TTL_LIMIT) as u8
    }

    /// Max TTL as a hop count. Only meaningful on a validated config.
    pub fn last_hop(&self) -> u8 {
        self.max_ttl.clamp(1, MAX_TTL_LIMIT) as u8
    }

    /// Retry budget per TTL.
    pub fn retry_budget(&self) -> u32 {
        self.retry.max(0) as u32
    }

    /// Receive timeout per probe.
    pub fn wait(&self) -> Duration {
        Duration::from_secs(self.wait_secs.clamp(MIN_WAIT_SECS, MAX_WAIT_SECS) as u64)
    }
}

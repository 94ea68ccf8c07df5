//! Hop records and the ordered trace result.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

/// Text shown in place of a responder address when a probe got no answer.
pub const NO_REPLY: &str = "*";

/// Outcome of a single probe attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HopRecord {
    /// The TTL the probe was sent with.
    pub ttl: u8,
    /// The address that answered (None if no response).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responder: Option<IpAddr>,
    /// Time from send until the reply was decoded, or the full wait on timeout.
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
    /// Whether the probe got an answer.
    pub responded: bool,
}

impl HopRecord {
    /// A record for a probe that was answered by `responder`.
    pub fn reply(ttl: u8, responder: IpAddr, elapsed: Duration) -> Self {
        Self {
            ttl,
            responder: Some(responder),
            elapsed,
            responded: true,
        }
    }

    /// A record for a probe that timed out or failed to receive.
    pub fn no_reply(ttl: u8, waited: Duration) -> Self {
        Self {
            ttl,
            responder: None,
            elapsed: waited,
            responded: false,
        }
    }

    /// The responder address as text, or [`NO_REPLY`].
    pub fn responder_text(&self) -> String {
        match self.responder {
            Some(ip) => ip.to_string(),
            None => NO_REPLY.to_string(),
        }
    }
}

/// Ordered, append-only sequence of hop records.
///
/// There is one record per probe attempt, so retries at the same TTL each
/// add a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceResult {
    hops: Vec<HopRecord>,
}

impl TraceResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: HopRecord) {
        self.hops.push(record);
    }

    pub fn hops(&self) -> &[HopRecord] {
        &self.hops
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HopRecord> {
        self.hops.iter()
    }

    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    pub fn last(&self) -> Option<&HopRecord> {
        self.hops.last()
    }

    pub fn into_hops(self) -> Vec<HopRecord> {
        self.hops
    }

    /// Returns true if the last record is an answer from `destination`.
    ///
    /// The probe loop does not say why it stopped; this is the check a
    /// caller uses to tell an arrival from TTL exhaustion.
    pub fn reached(&self, destination: IpAddr) -> bool {
        self.last()
            .is_some_and(|hop| hop.responded && hop.responder == Some(destination))
    }

    /// Serializes the records to JSON with indentation.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl<'a> IntoIterator for &'a TraceResult {
    type Item = &'a HopRecord;
    type IntoIter = std::slice::Iter<'a, HopRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.hops.iter()
    }
}

/// Durations travel as fractional milliseconds.
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_nanos() as f64 / 1_000_000.0)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let ms = f64::deserialize(d)?;
        if !ms.is_finite() || ms < 0.0 {
            return Err(serde::de::Error::custom(format!("invalid duration: {}", ms)));
        }
        Ok(Duration::from_secs_f64(ms / 1000.0))
    }
}

//! Serial traceroute execution.
//!
//! Sends one probe at a time and waits for a reply (or timeout) before
//! deciding what to send next.

use super::state::{ProbeEvent, ProbeState, Transition};
use crate::{HopRecord, ReplyKind, TraceConfig, TraceError, TraceResult, TracerouteDriver};
use std::time::Instant;
use tracing::{debug, info, trace};

/// Runs the TTL sweep against `driver` until it reaches a terminal state.
///
/// Every time-exceeded or destination-unreachable reply and every missing
/// reply adds one [`HopRecord`]. Other control messages are logged and
/// otherwise ignored. The returned sequence does not say whether the
/// destination was reached; see [`TraceResult::reached`].
pub fn traceroute_serial<D: TracerouteDriver + ?Sized>(
    driver: &mut D,
    config: &TraceConfig,
) -> Result<TraceResult, TraceError> {
    let config = config.validate()?;
    let destination = driver.destination();
    let wait = config.wait();

    let mut result = TraceResult::new();
    let mut state = ProbeState::initial(&config);

    loop {
        let send_time = Instant::now();

        trace!(ttl = state.ttl, port = state.port, retry = state.retry, "Sending probe");
        driver.send_probe(state.ttl, state.port)?;

        let event = match driver.receive_probe() {
            Ok(Some(reply)) => ProbeEvent::Reply(reply),
            Ok(None) => ProbeEvent::NoReply,
            Err(e) if e.is_non_response() => {
                debug!(ttl = state.ttl, error = %e, "Receive failed, counting as no reply");
                ProbeEvent::NoReply
            }
            Err(e) => {
                debug!(ttl = state.ttl, error = %e, "Fatal error during receive");
                return Err(e);
            }
        };

        match event {
            ProbeEvent::Reply(reply) => match reply.kind {
                ReplyKind::TimeExceeded | ReplyKind::DestinationUnreachable => {
                    let record = HopRecord::reply(state.ttl, reply.from, send_time.elapsed());
                    report_hop(config.debug, &record, Some(reply.kind));
                    result.push(record);
                }
                ReplyKind::Other { .. } => {
                    debug!(
                        ttl = state.ttl,
                        from = %reply.from,
                        kind = %reply.kind,
                        "Ignoring unrelated control message"
                    );
                }
            },
            ProbeEvent::NoReply => {
                let record = HopRecord::no_reply(state.ttl, wait);
                report_hop(config.debug, &record, None);
                result.push(record);
            }
        }

        match state.advance(&event, destination, &config) {
            Transition::Continue(next) => state = next,
            Transition::Done => {
                debug!(
                    probes = result.len(),
                    reached = result.reached(destination),
                    "Trace finished"
                );
                break;
            }
        }
    }

    Ok(result)
}

fn report_hop(echo: bool, record: &HopRecord, kind: Option<ReplyKind>) {
    let rtt_ms = record.elapsed.as_secs_f64() * 1000.0;
    let responder = record.responder_text();
    let kind = kind.map(|k| k.to_string()).unwrap_or_else(|| "no reply".to_string());
    if echo {
        info!(ttl = record.ttl, responder = %responder, rtt_ms, kind = %kind, "hop");
    } else {
        debug!(ttl = record.ttl, responder = %responder, rtt_ms, kind = %kind, "hop");
    }
}

//! The TTL / port sweep state machine.

use crate::{ProbeReply, ReplyKind, TraceConfig, DEST_MAX_PORT, DEST_MIN_PORT};
use std::net::IpAddr;

/// Position of the sweep between two probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeState {
    /// TTL of the next probe.
    pub ttl: u8,
    /// Failed attempts so far at this TTL.
    pub retry: u32,
    /// Destination port of the next probe.
    pub port: u16,
}

/// What happened to the probe sent from a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeEvent {
    Reply(ProbeReply),
    NoReply,
}

/// Result of [`ProbeState::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Continue(ProbeState),
    Done,
}

/// Port after `port` in the rotating probe range.
pub fn next_port(port: u16) -> u16 {
    if port >= DEST_MAX_PORT {
        DEST_MIN_PORT
    } else {
        port + 1
    }
}

impl ProbeState {
    /// State of the first probe for a validated config.
    pub fn initial(config: &TraceConfig) -> Self {
        Self {
            ttl: config.first_hop(),
            retry: 0,
            port: DEST_MIN_PORT,
        }
    }

    /// Applies one probe outcome.
    ///
    /// The sweep ends on a destination unreachable, on a time exceeded
    /// coming from the destination itself, or once the TTL passes the max.
    /// The port moves on after every probe, whether or not the TTL did.
    pub fn advance(self, event: &ProbeEvent, destination: IpAddr, config: &TraceConfig) -> Transition {
        let port = next_port(self.port);
        let last_hop = config.last_hop();

        match event {
            ProbeEvent::Reply(reply) => match reply.kind {
                ReplyKind::DestinationUnreachable => Transition::Done,
                ReplyKind::TimeExceeded => {
                    let ttl = self.ttl + 1;
                    if ttl > last_hop || reply.from == destination {
                        return Transition::Done;
                    }
                    Transition::Continue(ProbeState { ttl, retry: 0, port })
                }
                ReplyKind::Other { .. } => Transition::Continue(ProbeState { port, ..self }),
            },
            ProbeEvent::NoReply => {
                let mut ttl = self.ttl;
                let mut retry = self.retry + 1;
                if retry > config.retry_budget() {
                    retry = 0;
                    ttl += 1;
                }
                if ttl > last_hop {
                    return Transition::Done;
                }
                Transition::Continue(ProbeState { ttl, retry, port })
            }
        }
    }
}

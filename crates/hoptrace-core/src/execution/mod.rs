//! Probe loop execution.
//!
//! Probes are strictly sequential: one probe is in flight at a time and the
//! next is only sent once the previous one has been answered or timed out.

pub mod serial;
pub mod state;

pub use serial::traceroute_serial;
pub use state::{next_port, ProbeEvent, ProbeState, Transition};

//! Packet I/O for hoptrace.
//!
//! Provides the raw socket pair a trace runs on and the decoder that turns
//! reply bytes into a [`hoptrace_core::ReplyKind`].

pub mod parser;
pub mod socket;

pub use parser::{decode_icmpv4, decode_icmpv6, strip_ipv4_header, MIN_ICMP_LEN};
pub use socket::{SocketPair, RECV_BUFFER_LEN};

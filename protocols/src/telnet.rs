//! Minimal telnet (RFC 854) stream decoder.
//!
//! The session adapter only needs a plain NVT: every option the peer offers is
//! refused, subnegotiations are skipped, and everything else is passed through
//! as data. The decoder is incremental because a negotiation sequence may be
//! split across reads.

use tracing::trace;

pub const IAC: u8 = 255;
pub const DONT: u8 = 254;
pub const DO: u8 = 253;
pub const WONT: u8 = 252;
pub const WILL: u8 = 251;
pub const SB: u8 = 250;
pub const SE: u8 = 240;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Data,
    Iac,
    Negotiate(u8),
    Subnegotiation,
    SubnegotiationIac,
}

/// Result of feeding one chunk of bytes.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Decoded {
    /// Application data with every telnet command removed.
    pub data: Vec<u8>,
    /// Bytes that must be written back to the peer.
    pub replies: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct TelnetDecoder {
    state: State,
}

impl TelnetDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, bytes: &[u8]) -> Decoded {
        let mut out = Decoded::default();

        for &byte in bytes {
            self.state = match (self.state, byte) {
                (State::Data, IAC) => State::Iac,
                (State::Data, b) => {
                    out.data.push(b);
                    State::Data
                }
                (State::Iac, IAC) => {
                    out.data.push(IAC);
                    State::Data
                }
                (State::Iac, cmd @ (DO | DONT | WILL | WONT)) => State::Negotiate(cmd),
                (State::Iac, SB) => State::Subnegotiation,
                (State::Iac, _) => State::Data,
                (State::Negotiate(cmd), option) => {
                    if let Some(reply) = refusal(cmd) {
                        trace!(option, "refusing telnet option");
                        out.replies.extend_from_slice(&[IAC, reply, option]);
                    }
                    State::Data
                }
                (State::Subnegotiation, IAC) => State::SubnegotiationIac,
                (State::Subnegotiation, _) => State::Subnegotiation,
                (State::SubnegotiationIac, SE) => State::Data,
                (State::SubnegotiationIac, _) => State::Subnegotiation,
            };
        }

        out
    }
}

/// `DO` is answered with `WONT`, `WILL` with `DONT`. Refusals need no answer.
fn refusal(cmd: u8) -> Option<u8> {
    match cmd {
        DO => Some(WONT),
        WILL => Some(DONT),
        _ => None,
    }
}

/// Escapes literal `IAC` bytes in outgoing data.
pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    for &byte in data {
        if byte == IAC {
            out.push(IAC);
        }
        out.push(byte);
    }
    out
}

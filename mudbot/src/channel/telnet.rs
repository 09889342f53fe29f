//! Telnet IAC filtering for the incoming byte stream.
//!
//! kmud opens every connection with option negotiation. The filter strips
//! IAC sequences so they never reach pattern matching, and answers every
//! request with a refusal:
//! - `IAC DO <opt>`   => `IAC WONT <opt>`
//! - `IAC WILL <opt>` => `IAC DONT <opt>`
//!
//! Subnegotiation blocks (`IAC SB ... IAC SE`) are dropped whole.

const IAC: u8 = 255;
const DONT: u8 = 254;
const DO: u8 = 253;
const WONT: u8 = 252;
const WILL: u8 = 251;
const SB: u8 = 250;
const SE: u8 = 240;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum State {
    #[default]
    Data,
    Iac,
    Negotiate(u8),
    Subneg,
    SubnegIac,
}

/// Stateful IAC stripper. Sequences split across reads are handled.
#[derive(Debug, Default)]
pub struct TelnetFilter {
    state: State,
}

/// Output of one [`TelnetFilter::filter`] call.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Filtered {
    /// Application data with IAC sequences removed.
    pub data: Vec<u8>,

    /// Bytes to write back to the peer (may be empty).
    pub replies: Vec<u8>,
}

impl TelnetFilter {
    /// Create a filter in the plain-data state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter one chunk read from the peer.
    pub fn filter(&mut self, chunk: &[u8]) -> Filtered {
        // Fast path: no command bytes in flight or in this chunk.
        if self.state == State::Data && memchr::memchr(IAC, chunk).is_none() {
            return Filtered {
                data: chunk.to_vec(),
                replies: Vec::new(),
            };
        }

        let mut out = Filtered {
            data: Vec::with_capacity(chunk.len()),
            replies: Vec::new(),
        };

        for &b in chunk {
            self.state = match self.state {
                State::Data if b == IAC => State::Iac,
                State::Data => {
                    out.data.push(b);
                    State::Data
                }
                State::Iac => match b {
                    // Escaped 0xff is a literal data byte.
                    IAC => {
                        out.data.push(IAC);
                        State::Data
                    }
                    DO | DONT | WILL | WONT => State::Negotiate(b),
                    SB => State::Subneg,
                    // NOP, GA and friends carry no option byte.
                    _ => State::Data,
                },
                State::Negotiate(cmd) => {
                    match cmd {
                        DO => out.replies.extend_from_slice(&[IAC, WONT, b]),
                        WILL => out.replies.extend_from_slice(&[IAC, DONT, b]),
                        _ => {}
                    }
                    State::Data
                }
                State::Subneg if b == IAC => State::SubnegIac,
                State::Subneg => State::Subneg,
                State::SubnegIac if b == SE => State::Data,
                State::SubnegIac => State::Subneg,
            };
        }

        out
    }
}

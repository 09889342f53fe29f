//! TCP transport.
//!
//! kmud speaks plain telnet over TCP. This layer only opens the socket;
//! telnet option handling lives in the channel layer.

mod tcp;

pub use tcp::connect;

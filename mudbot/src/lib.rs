//! # mudbot
//!
//! Scripted telnet bots for the kmud text game server.
//!
//! mudbot drives a server's text dialogue the way an expect script would:
//! send a line, wait for one of several prompts, branch on which one
//! appeared. On top of that core sit three flows:
//!
//! - [`LoginFlow`]: the authentication handshake
//! - [`WanderLoop`]: read the room's exits, walk through a random one, repeat
//! - [`AccountProvisioner`]: batch-create numbered accounts with one character each
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mudbot::{Credentials, LoginFlow, Session, WanderLoop};
//! use rand::SeedableRng;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mudbot::Error> {
//!     let credentials = Credentials::new("localhost", 8945, "chris", "asdf")?;
//!     let mut session = Session::connect(credentials.session_config()).await?;
//!
//!     let state = LoginFlow::new(&credentials)?.run(&mut session).await?;
//!     if state.is_success() {
//!         let rng = rand::rngs::StdRng::from_entropy();
//!         WanderLoop::new(rng)?.run(&mut session).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod cli;
pub mod config;
pub mod error;
pub mod flows;
pub mod session;
pub mod transport;

// Re-export main types for convenience
pub use channel::{Match, PatternSet};
pub use config::{Credentials, ProvisionJob};
pub use error::{Error, Result};
pub use flows::{
    AccountProvisioner, Direction, ExitSet, LoginFlow, LoginState, ProvisionReport, WanderLoop,
};
pub use session::{Expect, Session, SessionConfig};

//! Scripted dialogues built on [`Session`](crate::session::Session).
//!
//! Each flow owns its tagged pattern sets and walks a small state machine,
//! one `expect` at a time.

pub mod exits;
mod login;
mod provision;
mod wander;

pub use exits::{Direction, EXIT_LIST_PATTERN, ExitSet};
pub use login::{LoginFlow, LoginState};
pub use provision::{
    AccountProvisioner, CandidateOutcome, ProvisionReport, ProvisionState,
};
pub use wander::{WanderLoop, WanderStop, WanderSummary};

/// kmud's menu and command prompt, at the very end of the output.
pub const COMMAND_PROMPT: &str = r"> $";

/// Look around the current room; the reply ends with an exit line.
pub const LOOK: &str = "l";

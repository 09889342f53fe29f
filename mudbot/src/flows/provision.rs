//! Batch account creation.
//!
//! Each candidate account goes through the new-user dialogue and then gets
//! one character named after it. Candidates are handled strictly in order
//! over a single session.
//!
//! ```text
//! AwaitMenu --"> "--> send "n" --> AwaitUsernamePrompt
//!   --"Desired username"--> send name --> AwaitPasswordPrompt
//!        (or "unavailable" --> Exists, skip candidate)
//!   --"Desired password"--> send password --> AwaitPasswordConfirm
//!   --"Confirm password"--> send password --> AwaitCharacterMenu
//!   --"> "--> send "n" --> AwaitCharacterName
//!   --"Desired character name"--> send name, "x", "x" --> Done
//! ```

use log::{debug, info, warn};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::channel::PatternSet;
use crate::config::ProvisionJob;
use crate::error::{Result, SessionError};
use crate::session::{Expect, Session};

use super::COMMAND_PROMPT;

/// Menu option creating a new user or character.
const NEW_ENTRY: &str = "n";

/// Answer given to each character attribute question.
const PLACEHOLDER_ATTRIBUTE: &str = "x";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AccountPrompt {
    Unavailable,
    DesiredUsername,
    DesiredPassword,
    ConfirmPassword,
    CommandMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharacterPrompt {
    CharacterName,
    CommandMenu,
}

/// Provisioning state for the current candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionState {
    AwaitMenu,
    AwaitUsernamePrompt,
    /// The username is taken.
    Exists,
    AwaitPasswordPrompt,
    AwaitPasswordConfirm,
    AwaitCharacterMenu,
    AwaitCharacterName,
    Done,
}

/// How one candidate ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOutcome {
    /// Account and character created.
    Created,
    /// The username was already taken.
    Unavailable,
    /// The server stopped answering; the candidate was abandoned.
    TimedOut,
}

/// Result of a provisioning batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    pub created: Vec<String>,
    /// Usernames skipped because they already exist.
    pub skipped: Vec<String>,
    /// Usernames abandoned after a timeout.
    pub abandoned: Vec<String>,
    /// The connection closed before the batch finished.
    pub interrupted: bool,
}

impl ProvisionReport {
    /// Number of candidates that reached an outcome.
    pub fn attempted(&self) -> usize {
        self.created.len() + self.skipped.len() + self.abandoned.len()
    }

    fn record(&mut self, username: String, outcome: CandidateOutcome) {
        match outcome {
            CandidateOutcome::Created => self.created.push(username),
            CandidateOutcome::Unavailable => self.skipped.push(username),
            CandidateOutcome::TimedOut => self.abandoned.push(username),
        }
    }
}

/// Creates the numbered accounts of a [`ProvisionJob`].
pub struct AccountProvisioner {
    job: ProvisionJob,
    account_patterns: PatternSet<AccountPrompt>,
    character_patterns: PatternSet<CharacterPrompt>,
}

impl AccountProvisioner {
    /// Compile the dialogue patterns for `job`.
    pub fn new(job: ProvisionJob) -> Result<Self> {
        // "unavailable" is followed by a fresh menu; check it first.
        let account_patterns = PatternSet::new()
            .with(AccountPrompt::Unavailable, r"unavailable")
            .and_then(|p| p.with(AccountPrompt::DesiredUsername, r"Desired username"))
            .and_then(|p| p.with(AccountPrompt::DesiredPassword, r"Desired password"))
            .and_then(|p| p.with(AccountPrompt::ConfirmPassword, r"Confirm password"))
            .and_then(|p| p.with(AccountPrompt::CommandMenu, COMMAND_PROMPT))
            .map_err(SessionError::InvalidPattern)?;

        let character_patterns = PatternSet::new()
            .with(CharacterPrompt::CharacterName, r"Desired character name")
            .and_then(|p| p.with(CharacterPrompt::CommandMenu, COMMAND_PROMPT))
            .map_err(SessionError::InvalidPattern)?;

        Ok(Self {
            job,
            account_patterns,
            character_patterns,
        })
    }

    /// Provision every candidate in order.
    ///
    /// A closed stream stops the batch and marks the report interrupted;
    /// remaining candidates are never attempted.
    pub async fn run<S>(&self, session: &mut Session<S>) -> Result<ProvisionReport>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut report = ProvisionReport::default();

        for username in self.job.usernames() {
            match self.provision_one(session, &username).await {
                Ok(outcome) => report.record(username, outcome),
                Err(e) if e.is_closed() => {
                    warn!(
                        "connection closed while creating {}; {} of {} accounts attempted",
                        username,
                        report.attempted(),
                        self.job.count
                    );
                    report.interrupted = true;
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "provisioning finished: {} created, {} skipped, {} abandoned",
            report.created.len(),
            report.skipped.len(),
            report.abandoned.len()
        );
        Ok(report)
    }

    /// Run the account dialogue for a single username.
    pub async fn provision_one<S>(
        &self,
        session: &mut Session<S>,
        username: &str,
    ) -> Result<CandidateOutcome>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut state = ProvisionState::AwaitMenu;

        loop {
            let prompt = match session.expect(&self.account_patterns).await? {
                Expect::Matched(found) => found.tag,
                Expect::Timeout => {
                    warn!("timed out creating {} in state {:?}", username, state);
                    return Ok(CandidateOutcome::TimedOut);
                }
            };

            state = match prompt {
                AccountPrompt::CommandMenu => {
                    session.send_line(NEW_ENTRY).await?;
                    ProvisionState::AwaitUsernamePrompt
                }
                AccountPrompt::DesiredUsername => {
                    session.send_line(username).await?;
                    ProvisionState::AwaitPasswordPrompt
                }
                AccountPrompt::Unavailable => {
                    debug!("{}: {:?}", username, ProvisionState::Exists);
                    info!("{} already exists, skipping", username);
                    return Ok(CandidateOutcome::Unavailable);
                }
                AccountPrompt::DesiredPassword => {
                    session.send_secret(&self.job.password).await?;
                    ProvisionState::AwaitPasswordConfirm
                }
                AccountPrompt::ConfirmPassword => {
                    session.send_secret(&self.job.password).await?;
                    return self.create_character(session, username).await;
                }
            };
            debug!("{}: {:?}", username, state);
        }
    }

    /// Character-creation sub-dialogue, entered once the account exists.
    async fn create_character<S>(
        &self,
        session: &mut Session<S>,
        username: &str,
    ) -> Result<CandidateOutcome>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut state = ProvisionState::AwaitCharacterMenu;

        loop {
            let prompt = match session.expect(&self.character_patterns).await? {
                Expect::Matched(found) => found.tag,
                Expect::Timeout => {
                    warn!("timed out creating character for {} in state {:?}", username, state);
                    return Ok(CandidateOutcome::TimedOut);
                }
            };

            match prompt {
                CharacterPrompt::CommandMenu => {
                    session.send_line(NEW_ENTRY).await?;
                    state = ProvisionState::AwaitCharacterName;
                }
                CharacterPrompt::CharacterName => {
                    session.send_line(username).await?;
                    session.send_line(PLACEHOLDER_ATTRIBUTE).await?;
                    session.send_line(PLACEHOLDER_ATTRIBUTE).await?;
                    debug!("{}: {:?}", username, ProvisionState::Done);
                    info!("created account {}", username);
                    return Ok(CandidateOutcome::Created);
                }
            }
        }
    }
}

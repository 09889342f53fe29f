//! Login handshake.
//!
//! From the main menu the bot enters the login submenu, answers the
//! username and password prompts, then picks the first character.
//!
//! ```text
//! AwaitPrompt --"> "--> send "l" --> AwaitPrompt
//!     |
//!     +--"Username:"--> send username --> AwaitUsername
//!                                             |
//!                  "Password:" --> send password, "1" --> Authenticated
//!
//! any state --"already online"--> AlreadyOnline
//! any state --"User not found"--> UserNotFound
//! any state --timeout-----------> TimedOut
//! ```

use log::{info, warn};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::channel::PatternSet;
use crate::config::Credentials;
use crate::error::{Result, SessionError};
use crate::session::{Expect, Session};

use super::COMMAND_PROMPT;

/// Main menu option opening the login submenu.
const ENTER_LOGIN: &str = "l";

/// Menu option selecting the first character after authenticating.
const SELECT_FIRST_CHARACTER: &str = "1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginPrompt {
    AlreadyOnline,
    UserNotFound,
    Username,
    Password,
    CommandPrompt,
}

/// Login state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    /// Waiting for the main menu or a more specific prompt.
    AwaitPrompt,
    /// Username sent, waiting for the password prompt.
    AwaitUsername,
    /// Password prompt seen, password being sent.
    AwaitPassword,
    Authenticated,
    /// The account already has a live session.
    AlreadyOnline,
    UserNotFound,
    /// No expected prompt arrived in time.
    TimedOut,
}

impl LoginState {
    /// Check if the dialogue has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoginState::Authenticated
                | LoginState::AlreadyOnline
                | LoginState::UserNotFound
                | LoginState::TimedOut
        )
    }

    /// Check if the character is in the game.
    pub fn is_success(&self) -> bool {
        *self == LoginState::Authenticated
    }
}

/// Drives the login dialogue for one set of credentials.
pub struct LoginFlow<'a> {
    credentials: &'a Credentials,
    patterns: PatternSet<LoginPrompt>,
    state: LoginState,
}

impl<'a> LoginFlow<'a> {
    /// Compile the login patterns for `credentials`.
    pub fn new(credentials: &'a Credentials) -> Result<Self> {
        // Rejections first: the server follows them with a fresh menu, and
        // both can arrive in one read.
        let patterns = PatternSet::new()
            .with(LoginPrompt::AlreadyOnline, r"already online")
            .and_then(|p| p.with(LoginPrompt::UserNotFound, r"User not found"))
            .and_then(|p| p.with(LoginPrompt::Username, r"Username: $"))
            .and_then(|p| p.with(LoginPrompt::Password, r"Password: $"))
            .and_then(|p| p.with(LoginPrompt::CommandPrompt, COMMAND_PROMPT))
            .map_err(SessionError::InvalidPattern)?;

        Ok(Self {
            credentials,
            patterns,
            state: LoginState::AwaitPrompt,
        })
    }

    /// Current state.
    pub fn state(&self) -> LoginState {
        self.state
    }

    /// Run until a terminal state is reached.
    ///
    /// Rejections and timeouts are returned as states, not errors. A closed
    /// stream is an error.
    pub async fn run<S>(&mut self, session: &mut Session<S>) -> Result<LoginState>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        info!("logging in as {}", self.credentials.username);

        while !self.state.is_terminal() {
            let prompt = match session.expect(&self.patterns).await? {
                Expect::Matched(m) => m.tag,
                Expect::Timeout => {
                    warn!("login timed out in state {:?}", self.state);
                    self.state = LoginState::TimedOut;
                    break;
                }
            };

            match prompt {
                // The menu can come back after a failed sub-step.
                LoginPrompt::CommandPrompt => {
                    session.send_line(ENTER_LOGIN).await?;
                    self.state = LoginState::AwaitPrompt;
                }
                LoginPrompt::Username => {
                    session.send_line(&self.credentials.username).await?;
                    self.state = LoginState::AwaitUsername;
                }
                LoginPrompt::Password => {
                    self.state = LoginState::AwaitPassword;
                    session.send_secret(&self.credentials.password).await?;
                    session.send_line(SELECT_FIRST_CHARACTER).await?;
                    info!("logged in as {}", self.credentials.username);
                    self.state = LoginState::Authenticated;
                }
                LoginPrompt::AlreadyOnline => {
                    warn!("login failed, {} is already online", self.credentials.username);
                    self.state = LoginState::AlreadyOnline;
                }
                LoginPrompt::UserNotFound => {
                    warn!("login failed, user {} not found", self.credentials.username);
                    self.state = LoginState::UserNotFound;
                }
            }
        }

        Ok(self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use std::time::Duration;
    use tokio_test::io::Builder;

    fn credentials() -> Credentials {
        Credentials::new("localhost", 8945, "chris", "asdf").unwrap()
    }

    #[tokio::test]
    async fn test_successful_login() {
        let mock = Builder::new()
            .read(b"Welcome to kmud\n\n[L]ogin\n[N]ew user\n> ")
            .write(b"l\r\n")
            .read(b"Username: ")
            .write(b"chris\r\n")
            .read(b"Password: ")
            .write(b"asdf\r\n")
            .write(b"1\r\n")
            .build();
        let mut session = Session::new(mock, SessionConfig::default());
        let creds = credentials();
        let mut flow = LoginFlow::new(&creds).unwrap();

        let state = flow.run(&mut session).await.unwrap();
        assert_eq!(state, LoginState::Authenticated);
        assert!(state.is_success());
    }

    #[tokio::test]
    async fn test_prompt_recurrence_tolerated() {
        let mock = Builder::new()
            .read(b"> ")
            .write(b"l\r\n")
            .read(b"Invalid selection\n> ")
            .write(b"l\r\n")
            .read(b"Username: ")
            .write(b"chris\r\n")
            .read(b"Password: ")
            .write(b"asdf\r\n")
            .write(b"1\r\n")
            .build();
        let mut session = Session::new(mock, SessionConfig::default());
        let creds = credentials();

        let state = LoginFlow::new(&creds).unwrap().run(&mut session).await.unwrap();
        assert_eq!(state, LoginState::Authenticated);
    }

    #[tokio::test]
    async fn test_already_online() {
        let mock = Builder::new()
            .read(b"> ")
            .write(b"l\r\n")
            .read(b"Username: ")
            .write(b"chris\r\n")
            .read(b"That user is already online\n> ")
            .build();
        let mut session = Session::new(mock, SessionConfig::default());
        let creds = credentials();
        let mut flow = LoginFlow::new(&creds).unwrap();

        let state = flow.run(&mut session).await.unwrap();
        assert_eq!(state, LoginState::AlreadyOnline);
        assert_eq!(flow.state(), LoginState::AlreadyOnline);
    }

    #[tokio::test]
    async fn test_user_not_found() {
        let mock = Builder::new()
            .read(b"Username: ")
            .write(b"chris\r\n")
            .read(b"User not found\n> ")
            .build();
        let mut session = Session::new(mock, SessionConfig::default());
        let creds = credentials();

        let state = LoginFlow::new(&creds).unwrap().run(&mut session).await.unwrap();
        assert_eq!(state, LoginState::UserNotFound);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_terminal() {
        let mock = Builder::new()
            .read(b"Welcome to kmud\n")
            .wait(Duration::from_secs(60))
            .build();
        let mut session = Session::new(mock, SessionConfig::default());
        let creds = credentials();

        let state = LoginFlow::new(&creds).unwrap().run(&mut session).await.unwrap();
        assert_eq!(state, LoginState::TimedOut);
    }

    #[tokio::test]
    async fn test_stream_closed_is_error() {
        let mock = Builder::new().read(b"> ").write(b"l\r\n").build();
        let mut session = Session::new(mock, SessionConfig::default());
        let creds = credentials();

        let err = LoginFlow::new(&creds).unwrap().run(&mut session).await.unwrap_err();
        assert!(err.is_closed());
    }
}

//! Command-line front ends and process exit codes.
//!
//! Both binaries take positional arguments only. Arguments are parsed and
//! validated once, before any connection is opened.

use std::ffi::OsString;

use clap::{CommandFactory, Parser};
use clap::error::ErrorKind;
use log::{error, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::config::{Credentials, ProvisionJob};
use crate::error::{Error, Result, TransportError};
use crate::flows::{AccountProvisioner, LoginFlow, LoginState, WanderLoop};
use crate::session::{DEFAULT_HOST, DEFAULT_PORT, Session, SessionConfig};

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Normal exit, including the server closing the connection.
    Success = 0,
    /// Missing or malformed arguments.
    Usage = 1,
    AlreadyOnline = 2,
    UserNotFound = 3,
    /// The server could not be reached.
    ConnectionFailed = 4,
    /// Unexpected I/O or internal failure mid-session.
    Failure = 5,
}

impl ExitCode {
    /// Exit code for a login that reached `state`.
    pub fn from_login(state: LoginState) -> Self {
        match state {
            LoginState::AlreadyOnline => ExitCode::AlreadyOnline,
            LoginState::UserNotFound => ExitCode::UserNotFound,
            _ => ExitCode::Success,
        }
    }

    /// Exit code for a fatal error.
    pub fn from_error(err: &Error) -> Self {
        match err {
            e if e.is_closed() => ExitCode::Success,
            Error::Transport(TransportError::ConnectionFailed { .. })
            | Error::Transport(TransportError::Timeout(_)) => ExitCode::ConnectionFailed,
            Error::Config(_) => ExitCode::Usage,
            _ => ExitCode::Failure,
        }
    }

    /// Numeric process exit status.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.code())
    }
}

/// Arguments for `mudbot-wander`.
#[derive(Parser, Debug)]
#[command(name = "mudbot-wander")]
#[command(about = "Log in to a kmud server and wander between rooms at random")]
pub struct WanderArgs {
    /// Server host
    #[arg(default_value = DEFAULT_HOST)]
    pub host: String,

    /// Server port
    #[arg(default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Account to log in as
    #[arg(default_value = "chris")]
    pub username: String,

    /// Account password
    #[arg(default_value = "asdf")]
    pub password: String,
}

impl WanderArgs {
    pub fn into_credentials(self) -> Result<Credentials> {
        Ok(Credentials::new(
            self.host,
            self.port,
            self.username,
            self.password,
        )?)
    }
}

/// Arguments for `mudbot-provision`.
#[derive(Parser, Debug)]
#[command(name = "mudbot-provision")]
#[command(about = "Create numbered kmud accounts (unit1, unit2, ...) with one character each")]
pub struct ProvisionArgs {
    /// Number of accounts to create
    pub count: usize,

    /// Server host
    #[arg(default_value = DEFAULT_HOST)]
    pub host: String,

    /// Server port
    #[arg(default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl ProvisionArgs {
    pub fn into_parts(self) -> (SessionConfig, ProvisionJob) {
        (
            SessionConfig::new(self.host).port(self.port),
            ProvisionJob::with_defaults(self.count),
        )
    }
}

/// Parse arguments, printing usage to stdout on failure.
///
/// `--help` and `--version` map to [`ExitCode::Success`]; anything else
/// that fails to parse maps to [`ExitCode::Usage`].
pub fn parse_args<P, I, T>(args: I) -> std::result::Result<P, ExitCode>
where
    P: Parser,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match P::try_parse_from(args) {
        Ok(parsed) => Ok(parsed),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = err.print();
                Err(ExitCode::Success)
            }
            _ => {
                println!("{}", P::command().render_usage());
                Err(ExitCode::Usage)
            }
        },
    }
}

/// Connect, log in, and wander until the server hangs up.
pub async fn run_wander(credentials: Credentials) -> ExitCode {
    let mut session = match Session::connect(credentials.session_config()).await {
        Ok(session) => session,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from_error(&e);
        }
    };

    let rng = StdRng::from_entropy();
    wander_session(&mut session, &credentials, rng, None).await
}

/// Log in on an open session, then wander.
///
/// With `max_moves` unset the walk only ends when the session does.
pub async fn wander_session<S, R>(
    session: &mut Session<S>,
    credentials: &Credentials,
    rng: R,
    max_moves: Option<u64>,
) -> ExitCode
where
    S: AsyncRead + AsyncWrite + Unpin,
    R: rand::Rng,
{
    finish(login_and_wander(session, credentials, rng, max_moves).await)
}

async fn login_and_wander<S, R>(
    session: &mut Session<S>,
    credentials: &Credentials,
    rng: R,
    max_moves: Option<u64>,
) -> Result<ExitCode>
where
    S: AsyncRead + AsyncWrite + Unpin,
    R: rand::Rng,
{
    let state = LoginFlow::new(credentials)?.run(session).await?;
    if !state.is_success() {
        return Ok(ExitCode::from_login(state));
    }

    let mut wander = WanderLoop::new(rng)?;
    if let Some(max) = max_moves {
        wander = wander.with_max_moves(max);
    }
    let summary = wander.run(session).await?;
    info!("{} moves, {} looks ({:?})", summary.moves, summary.looks, summary.stop);
    Ok(ExitCode::Success)
}

/// Connect and provision every account in `job`.
pub async fn run_provision(config: SessionConfig, job: ProvisionJob) -> ExitCode {
    let mut session = match Session::connect(config).await {
        Ok(session) => session,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from_error(&e);
        }
    };

    provision_session(&mut session, job).await
}

/// Provision every account in `job` on an open session.
pub async fn provision_session<S>(session: &mut Session<S>, job: ProvisionJob) -> ExitCode
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    finish(provision(session, job).await)
}

async fn provision<S>(session: &mut Session<S>, job: ProvisionJob) -> Result<ExitCode>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let report = AccountProvisioner::new(job)?.run(session).await?;
    if report.interrupted {
        warn!("batch interrupted; re-run to create the remaining accounts");
    }
    Ok(ExitCode::Success)
}

fn finish(result: Result<ExitCode>) -> ExitCode {
    match result {
        Ok(code) => code,
        Err(e) if e.is_closed() => {
            info!("connection closed by server");
            ExitCode::Success
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::from_error(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio_test::io::Builder;

    fn credentials() -> Credentials {
        Credentials::new("localhost", 8945, "chris", "asdf").unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    #[test]
    fn test_wander_defaults() {
        let args: WanderArgs = parse_args(["mudbot-wander"]).unwrap();
        assert_eq!(args.host, "localhost");
        assert_eq!(args.port, 8945);
        assert_eq!(args.username, "chris");
        assert_eq!(args.password, "asdf");
    }

    #[test]
    fn test_wander_positional_overrides() {
        let args: WanderArgs =
            parse_args(["mudbot-wander", "mud.example.org", "4000", "alice", "pw"]).unwrap();
        assert_eq!(args.host, "mud.example.org");
        assert_eq!(args.port, 4000);
        assert_eq!(args.username, "alice");
        let creds = args.into_credentials().unwrap();
        assert_eq!(creds.session_config().socket_addr(), "mud.example.org:4000");
    }

    #[test]
    fn test_malformed_port_is_usage_error() {
        let result = parse_args::<WanderArgs, _, _>(["mudbot-wander", "localhost", "notaport"]);
        assert_eq!(result.unwrap_err(), ExitCode::Usage);
    }

    #[test]
    fn test_provision_requires_count() {
        let result = parse_args::<ProvisionArgs, _, _>(["mudbot-provision"]);
        assert_eq!(result.unwrap_err(), ExitCode::Usage);

        let result = parse_args::<ProvisionArgs, _, _>(["mudbot-provision", "three"]);
        assert_eq!(result.unwrap_err(), ExitCode::Usage);
    }

    #[test]
    fn test_provision_args() {
        let args: ProvisionArgs = parse_args(["mudbot-provision", "3", "mud.example.org"]).unwrap();
        let (config, job) = args.into_parts();
        assert_eq!(config.socket_addr(), "mud.example.org:8945");
        assert_eq!(job.usernames().collect::<Vec<_>>(), vec!["unit1", "unit2", "unit3"]);
    }

    #[test]
    fn test_help_is_success() {
        let result = parse_args::<WanderArgs, _, _>(["mudbot-wander", "--help"]);
        assert_eq!(result.unwrap_err(), ExitCode::Success);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitCode::from_login(LoginState::AlreadyOnline).code(), 2);
        assert_eq!(ExitCode::from_login(LoginState::UserNotFound).code(), 3);
        assert_eq!(ExitCode::from_login(LoginState::TimedOut).code(), 0);
        assert_eq!(ExitCode::Usage.code(), 1);

        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "reset");
        let err = Error::Transport(TransportError::Io(io));
        assert_eq!(ExitCode::from_error(&err).code(), 5);
    }

    #[tokio::test]
    async fn test_already_online_exit_code() {
        let mock = Builder::new()
            .read(b"> ")
            .write(b"l\r\n")
            .read(b"Username: ")
            .write(b"chris\r\n")
            .read(b"That user is already online\n")
            .build();
        let mut session = Session::new(mock, SessionConfig::default());

        let code = wander_session(&mut session, &credentials(), rng(), None).await;
        assert_eq!(code, ExitCode::AlreadyOnline);
    }

    #[tokio::test]
    async fn test_user_not_found_exit_code() {
        let mock = Builder::new()
            .read(b"Username: ")
            .write(b"chris\r\n")
            .read(b"User not found\n")
            .build();
        let mut session = Session::new(mock, SessionConfig::default());

        let code = wander_session(&mut session, &credentials(), rng(), None).await;
        assert_eq!(code, ExitCode::UserNotFound);
    }

    #[tokio::test]
    async fn test_closed_during_login_is_clean() {
        let mock = Builder::new().read(b"> ").write(b"l\r\n").read(b"Usern").build();
        let mut session = Session::new(mock, SessionConfig::default());

        let code = wander_session(&mut session, &credentials(), rng(), None).await;
        assert_eq!(code, ExitCode::Success);
    }

    #[tokio::test]
    async fn test_login_then_wander_until_closed() {
        let mock = Builder::new()
            .read(b"> ")
            .write(b"l\r\n")
            .read(b"Username: ")
            .write(b"chris\r\n")
            .read(b"Password: ")
            .write(b"asdf\r\n")
            .write(b"1\r\n")
            .read(b" >>> Town Square <<<\n\n Exits: [N]orth\n> ")
            .write(b"N\r\n")
            .build();
        let mut session = Session::new(mock, SessionConfig::default());

        let code = wander_session(&mut session, &credentials(), rng(), None).await;
        assert_eq!(code, ExitCode::Success);
    }

    #[tokio::test]
    async fn test_provision_session_closed_is_clean() {
        let mock = Builder::new().read(b"> ").write(b"n\r\n").build();
        let mut session = Session::new(mock, SessionConfig::default());

        let code = provision_session(&mut session, ProvisionJob::with_defaults(2)).await;
        assert_eq!(code, ExitCode::Success);
    }

    #[tokio::test]
    async fn test_run_wander_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let creds = Credentials::new("127.0.0.1", port, "chris", "asdf").unwrap();
        assert_eq!(run_wander(creds).await, ExitCode::ConnectionFailed);
    }

    #[tokio::test]
    async fn test_run_wander_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            // Telnet negotiation, then the main menu.
            socket.write_all(&[255, 251, 1]).await.unwrap();
            socket.write_all(b"Welcome\n> ").await.unwrap();

            let mut received = Vec::new();
            let mut buf = [0u8; 64];
            while !received.ends_with(b"l\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                received.extend_from_slice(&buf[..n]);
            }
            socket.write_all(b"User not found\n").await.unwrap();
            received
        });

        let creds = Credentials::new("127.0.0.1", port, "chris", "asdf").unwrap();
        assert_eq!(run_wander(creds).await, ExitCode::UserNotFound);

        let received = server.await.unwrap();
        assert_eq!(received, [&[255u8, 254, 1][..], b"l\r\n"].concat());
    }
}

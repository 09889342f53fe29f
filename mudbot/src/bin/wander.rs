//! Log in to a kmud server and wander between rooms until disconnected.
//!
//! ```bash
//! mudbot-wander [host] [port] [username] [password]
//! ```

use std::process::ExitCode;

use mudbot::cli::{self, WanderArgs};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: WanderArgs = match cli::parse_args(std::env::args_os()) {
        Ok(args) => args,
        Err(code) => return code.into(),
    };

    let credentials = match args.into_credentials() {
        Ok(credentials) => credentials,
        Err(e) => {
            println!("{}", e);
            return cli::ExitCode::from_error(&e).into();
        }
    };

    cli::run_wander(credentials).await.into()
}

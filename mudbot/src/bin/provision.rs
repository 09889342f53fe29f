//! Create `count` numbered accounts (unit1, unit2, ...) on a kmud server.
//!
//! ```bash
//! mudbot-provision <count> [host] [port]
//! ```

use std::process::ExitCode;

use log::info;
use mudbot::cli::{self, ProvisionArgs};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: ProvisionArgs = match cli::parse_args(std::env::args_os()) {
        Ok(args) => args,
        Err(code) => return code.into(),
    };

    let (config, job) = args.into_parts();
    info!("creating {} accounts on {}", job.count, config.socket_addr());

    cli::run_provision(config, job).await.into()
}

//!
//! pushauth binary
//! ---------------
//! Approves one pending login from a push-notification token. Configuration
//! comes from `PUSHAUTH_*` environment variables, overridden by flags.

use std::env;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();

    let args: Vec<String> = env::args().collect();
    let code = pushauth::cli::execute(
        &args,
        |name| env::var(name).ok(),
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    )
    .await;
    ExitCode::from(code)
}

//! Command-line front end shared by the `pushauth` binary and its tests.

use std::io::Write;

use anyhow::{Context, Result};

use crate::config::{has_flag, parse_string_arg, ClientConfig};
use crate::error::AppError;
use crate::service::PushAuthenticationService;

pub const USAGE: &str = "pushauth\n\nUSAGE:\n  pushauth --token TOKEN [--accounts-file PATH] [--api-base URL] [--timeout-ms N] [--user-agent UA]\n\nOPTIONS:\n  --token TOKEN          Push authentication token to approve (required)\n  --accounts-file PATH   JSON array of stored accounts (env: PUSHAUTH_ACCOUNTS_FILE)\n  --api-base URL         REST API base (env: PUSHAUTH_API_BASE, default https://public-api.wordpress.com/rest/v1.1)\n  --timeout-ms N         Request timeout in milliseconds (env: PUSHAUTH_TIMEOUT_MS, default 30000)\n  --user-agent UA        User-Agent header (env: PUSHAUTH_USER_AGENT)\n";

pub const EXIT_AUTHORIZED: u8 = 0;
pub const EXIT_NOT_AUTHORIZED: u8 = 1;

async fn run<F>(args: &[String], lookup: F) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    // An empty token is still forwarded; only a missing flag is a usage error.
    let token = parse_string_arg(args, "--token")?
        .ok_or_else(|| AppError::user("missing_token", "--token is required"))?;
    let config = ClientConfig::from_lookup(lookup)
        .and_then(|cfg| cfg.apply_args(args))
        .context("invalid configuration")?;
    tracing::info!(
        target: "pushauth",
        "pushauth starting: api_base='{}', timeout_ms={}, accounts_file={:?}",
        config.api_base,
        config.timeout.as_millis(),
        config.accounts_file
    );
    let service = PushAuthenticationService::from_config(&config).context("could not set up the authorization service")?;
    Ok(service.authorize_login(&token).await)
}

/// Exit status for a failed run: the `AppError` in the chain decides, otherwise 1.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<AppError>()
        .map(|e| u8::try_from(e.exit_code()).unwrap_or(EXIT_NOT_AUTHORIZED))
        .unwrap_or(EXIT_NOT_AUTHORIZED)
}

/// Run one invocation, writing the verdict to `out` and diagnostics to `err`. Returns the exit status.
pub async fn execute<F, W, E>(args: &[String], lookup: F, out: &mut W, err: &mut E) -> u8
where
    F: Fn(&str) -> Option<String>,
    W: Write,
    E: Write,
{
    if has_flag(args, "--help") || has_flag(args, "-h") {
        let _ = writeln!(out, "{}", USAGE);
        return EXIT_AUTHORIZED;
    }
    match run(args, lookup).await {
        Ok(true) => {
            let _ = writeln!(out, "authorized");
            EXIT_AUTHORIZED
        }
        Ok(false) => {
            let _ = writeln!(out, "not authorized");
            EXIT_NOT_AUTHORIZED
        }
        Err(e) => {
            let _ = writeln!(err, "error: {:#}", e);
            if matches!(e.downcast_ref::<AppError>(), Some(AppError::UserInput { .. })) {
                let _ = writeln!(err, "{}", USAGE);
            }
            exit_code_for(&e)
        }
    }
}

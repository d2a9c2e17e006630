//!
//! Client configuration
//! --------------------
//! Defaults, overridden by `PUSHAUTH_*` environment variables, overridden by
//! command-line flags.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, AppResult};

pub const DEFAULT_API_BASE: &str = "https://public-api.wordpress.com/rest/v1.1";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_USER_AGENT: &str = concat!("pushauth/", env!("CARGO_PKG_VERSION"));

pub const ENV_API_BASE: &str = "PUSHAUTH_API_BASE";
pub const ENV_TIMEOUT_MS: &str = "PUSHAUTH_TIMEOUT_MS";
pub const ENV_USER_AGENT: &str = "PUSHAUTH_USER_AGENT";
pub const ENV_ACCOUNTS_FILE: &str = "PUSHAUTH_ACCOUNTS_FILE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub accounts_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accounts_file: None,
        }
    }
}

fn parse_timeout_ms(raw: &str, source: &str) -> AppResult<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(AppError::config(
            "invalid_timeout".to_string(),
            format!("{} must be a positive number of milliseconds, got '{}'", source, raw),
        )),
    }
}

fn validate_api_base(raw: &str, source: &str) -> AppResult<String> {
    let url = reqwest::Url::parse(raw.trim()).map_err(|e| {
        AppError::config("invalid_api_base".to_string(), format!("{} is not a valid URL ('{}'): {}", source, raw, e))
    })?;
    match url.scheme() {
        "http" | "https" => Ok(raw.trim().trim_end_matches('/').to_string()),
        other => Err(AppError::config(
            "invalid_api_base".to_string(),
            format!("{} must use http or https, got '{}'", source, other),
        )),
    }
}

/// Flags that consume the next argument as their value.
pub const VALUE_FLAGS: &[&str] = &["--token", "--accounts-file", "--api-base", "--timeout-ms", "--user-agent"];

// Position of `flag`, skipping over the values of other value-taking flags.
fn flag_position(args: &[String], flag: &str) -> Option<usize> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag {
            return Some(i);
        }
        i += if VALUE_FLAGS.contains(&args[i].as_str()) { 2 } else { 1 };
    }
    None
}

// The argument after `flag` is taken verbatim, even if it looks like a flag.
fn arg_value<'a>(args: &'a [String], flag: &str) -> AppResult<Option<&'a str>> {
    let Some(pos) = flag_position(args, flag) else { return Ok(None) };
    match args.get(pos + 1) {
        Some(v) => Ok(Some(v.as_str())),
        None => Err(AppError::user("missing_value".to_string(), format!("{} requires a value", flag))),
    }
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    flag_position(args, flag).is_some()
}

/// Value following `flag`, if present.
pub fn parse_string_arg(args: &[String], flag: &str) -> AppResult<Option<String>> {
    Ok(arg_value(args, flag)?.map(str::to_string))
}

impl ClientConfig {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = lookup(ENV_API_BASE).filter(|v| !v.trim().is_empty()) {
            cfg.api_base = validate_api_base(&v, ENV_API_BASE)?;
        }
        if let Some(v) = lookup(ENV_TIMEOUT_MS).filter(|v| !v.trim().is_empty()) {
            cfg.timeout = parse_timeout_ms(&v, ENV_TIMEOUT_MS)?;
        }
        if let Some(v) = lookup(ENV_USER_AGENT).filter(|v| !v.trim().is_empty()) {
            cfg.user_agent = v;
        }
        if let Some(v) = lookup(ENV_ACCOUNTS_FILE).filter(|v| !v.trim().is_empty()) {
            cfg.accounts_file = Some(PathBuf::from(v));
        }
        Ok(cfg)
    }

    /// CLI arguments override whatever the environment provided.
    pub fn apply_args(mut self, args: &[String]) -> AppResult<Self> {
        if let Some(v) = arg_value(args, "--api-base")? {
            self.api_base = validate_api_base(v, "--api-base")?;
        }
        if let Some(v) = arg_value(args, "--timeout-ms")? {
            self.timeout = parse_timeout_ms(v, "--timeout-ms")?;
        }
        if let Some(v) = arg_value(args, "--user-agent")? {
            self.user_agent = v.to_string();
        }
        if let Some(v) = arg_value(args, "--accounts-file")? {
            self.accounts_file = Some(PathBuf::from(v));
        }
        Ok(self)
    }
}

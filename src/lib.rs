//! Approve two-factor login attempts from a push-notification token.
//!
//! The flow: resolve which stored account (if any) signs the request, submit the
//! token to the WordPress.com REST API, and report a plain `bool`.

pub mod cli;
pub mod config;
pub mod error;
pub mod identity;
pub mod remote;
pub mod service;

pub use config::ClientConfig;
pub use error::{AppError, AppResult};
pub use identity::{Account, AccountLookup, CredentialContext, RestCredentials};
pub use remote::{AuthorizationRemote, RemoteError, RemoteFactory};
pub use service::PushAuthenticationService;

//! Remote authority boundary.
//! `AuthorizationRemote` performs the network call; `RemoteFactory` builds one
//! for a resolved credential context.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::AppResult;
use crate::identity::{CredentialContext, RestCredentials};

mod rest;

pub use rest::{RestApi, RestApiFactory, PUSH_AUTHENTICATION_PATH};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// The authority answered and declined (invalid, expired or already used token).
    #[error("rejected by remote (HTTP {status}): {code} {message}")]
    Rejected { status: u16, code: String, message: String },
    #[error("transport failure: {0}")]
    Transport(String),
}

impl RemoteError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, RemoteError::Rejected { .. })
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        RemoteError::Transport(err.to_string())
    }
}

#[async_trait]
pub trait AuthorizationRemote: Send + Sync {
    /// Ask the authority to approve the pending login identified by `token`.
    async fn authorize_login(&self, token: &str) -> Result<(), RemoteError>;
}

pub trait RemoteFactory: Send + Sync {
    fn authenticated(&self, credentials: &RestCredentials) -> AppResult<Arc<dyn AuthorizationRemote>>;

    /// A remote usable without stored credentials.
    fn anonymous(&self) -> AppResult<Arc<dyn AuthorizationRemote>>;

    fn remote_for(&self, ctx: &CredentialContext) -> AppResult<Arc<dyn AuthorizationRemote>> {
        match ctx {
            CredentialContext::Authenticated(credentials) => self.authenticated(credentials),
            CredentialContext::Anonymous => self.anonymous(),
        }
    }
}

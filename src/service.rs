//! Push-notification login approval.
//!
//! `PushAuthenticationService` resolves a credential context once, at
//! construction, and submits push tokens to the remote authority under it.
//! Every failure mode collapses to `false`; callers never see error details.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::config::ClientConfig;
use crate::error::AppResult;
use crate::identity::{resolve_context, AccountLookup, CredentialContext, InMemoryAccountStore, JsonAccountStore};
use crate::remote::{AuthorizationRemote, RemoteFactory, RestApiFactory};

/// Lifecycle of a single authorization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    Requesting,
    Succeeded,
    Failed,
}

impl RequestState {
    pub fn settled(outcome: bool) -> Self {
        if outcome { RequestState::Succeeded } else { RequestState::Failed }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RequestState::Succeeded | RequestState::Failed)
    }
}

type Completion = Box<dyn FnOnce(bool) + Send + 'static>;

/// Single-shot holder for a completion callback. The first `complete` wins; later ones are refused.
pub struct CompletionCell {
    slot: Mutex<Option<Completion>>,
}

impl CompletionCell {
    pub fn new<F>(completion: F) -> Self
    where
        F: FnOnce(bool) + Send + 'static,
    {
        Self { slot: Mutex::new(Some(Box::new(completion))) }
    }

    /// Returns false if the callback already fired.
    pub fn complete(&self, outcome: bool) -> bool {
        let completion = self.slot.lock().take();
        match completion {
            Some(f) => {
                f(outcome);
                true
            }
            None => {
                tracing::warn!(target: "pushauth::service", "completion already delivered; dropping outcome={}", outcome);
                false
            }
        }
    }

    pub fn is_completed(&self) -> bool { self.slot.lock().is_none() }
}

impl fmt::Debug for CompletionCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionCell").field("completed", &self.is_completed()).finish()
    }
}

fn transition(from: RequestState, to: RequestState, token_len: usize) -> RequestState {
    tracing::trace!(target: "pushauth::service", "authorize_login {:?} -> {:?} (token_len={})", from, to, token_len);
    to
}

async fn submit(remote: Option<Arc<dyn AuthorizationRemote>>, token: &str) -> bool {
    let Some(remote) = remote else {
        tracing::warn!(target: "pushauth::service", "no remote client available; reporting authorization failure");
        return false;
    };
    let state = transition(RequestState::Idle, RequestState::Requesting, token.len());
    let outcome = match remote.authorize_login(token).await {
        Ok(()) => true,
        Err(e) if e.is_rejection() => {
            tracing::info!(target: "pushauth::service", "login authorization declined: {}", e);
            false
        }
        Err(e) => {
            tracing::warn!(target: "pushauth::service", "login authorization failed: {}", e);
            false
        }
    };
    let state = transition(state, RequestState::settled(outcome), token.len());
    debug_assert!(state.is_terminal());
    outcome
}

pub struct PushAuthenticationService {
    context: CredentialContext,
    remote: Option<Arc<dyn AuthorizationRemote>>,
}

impl PushAuthenticationService {
    /// Resolve the credential context from `accounts` and build the remote for it.
    /// A factory failure leaves the service without a remote; every request then reports `false`.
    pub fn new(accounts: &dyn AccountLookup, factory: &dyn RemoteFactory) -> Self {
        let context = resolve_context(accounts);
        let remote = match factory.remote_for(&context) {
            Ok(remote) => Some(remote),
            Err(e) => {
                tracing::warn!(target: "pushauth::service", "could not build remote for {}: {}", context.describe(), e);
                None
            }
        };
        Self { context, remote }
    }

    /// Use an already-built remote (or none) for a known context.
    pub fn with_remote(context: CredentialContext, remote: Option<Arc<dyn AuthorizationRemote>>) -> Self {
        Self { context, remote }
    }

    /// Wire the REST transport and, if configured, the JSON accounts file.
    pub fn from_config(config: &ClientConfig) -> AppResult<Self> {
        let factory = RestApiFactory::new(config.clone());
        let service = match &config.accounts_file {
            Some(path) => Self::new(&JsonAccountStore::load(path)?, &factory),
            None => Self::new(&InMemoryAccountStore::default(), &factory),
        };
        Ok(service)
    }

    pub fn context(&self) -> &CredentialContext { &self.context }

    pub fn has_remote(&self) -> bool { self.remote.is_some() }

    /// Submit `token` verbatim; resolves to `true` only when the authority approves it.
    pub async fn authorize_login(&self, token: &str) -> bool {
        tracing::debug!(target: "pushauth::service", "authorizing login as {}", self.context.describe());
        submit(self.remote.clone(), token).await
    }

    /// Callback form of `authorize_login`. Spawns on the ambient tokio runtime and
    /// invokes `completion` exactly once, after the remote round-trip.
    ///
    /// Without a runtime nothing is sent: `completion(false)` runs on the calling
    /// thread and `None` is returned. A panic inside the remote also reports `false`.
    pub fn authorize_login_with<F>(&self, token: impl Into<String>, completion: F) -> Option<JoinHandle<()>>
    where
        F: FnOnce(bool) + Send + 'static,
    {
        let cell = CompletionCell::new(completion);
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(target: "pushauth::service", "no tokio runtime for authorize_login_with ({}); reporting failure", e);
                cell.complete(false);
                return None;
            }
        };
        let token = token.into();
        let remote = self.remote.clone();
        tracing::debug!(target: "pushauth::service", "authorizing login as {}", self.context.describe());
        let request = handle.spawn(async move { submit(remote, &token).await });
        Some(handle.spawn(async move {
            let outcome = match request.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!(target: "pushauth::service", "authorization task did not finish: {}", e);
                    false
                }
            };
            cell.complete(outcome);
        }))
    }
}

impl fmt::Debug for PushAuthenticationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushAuthenticationService")
            .field("context", &self.context.describe())
            .field("has_remote", &self.has_remote())
            .finish()
    }
}

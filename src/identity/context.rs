use super::account::{AccountLookup, RestCredentials};

/// Identity under which the authorization request is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialContext {
    Authenticated(RestCredentials),
    Anonymous,
}

impl CredentialContext {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, CredentialContext::Authenticated(_))
    }

    pub fn credentials(&self) -> Option<&RestCredentials> {
        match self {
            CredentialContext::Authenticated(c) => Some(c),
            CredentialContext::Anonymous => None,
        }
    }

    /// Short label for logs; never includes the bearer token.
    pub fn describe(&self) -> String {
        match self {
            CredentialContext::Authenticated(c) => format!("authenticated:{}", c.username),
            CredentialContext::Anonymous => "anonymous".to_string(),
        }
    }
}

/// Pick the default account's credentials when they are usable, otherwise fall back to anonymous.
pub fn resolve_context(accounts: &dyn AccountLookup) -> CredentialContext {
    let ctx = match accounts.default_account() {
        Some(account) if account.credentials.has_valid_credentials() => {
            CredentialContext::Authenticated(account.credentials)
        }
        Some(account) => {
            tracing::debug!(target: "pushauth::identity", "default account '{}' has no credentials", account.username);
            CredentialContext::Anonymous
        }
        None => CredentialContext::Anonymous,
    };
    tracing::debug!(target: "pushauth::identity", "resolved credential context: {}", ctx.describe());
    ctx
}

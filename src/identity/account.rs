use std::fmt;

use serde::{Deserialize, Serialize};

/// Credential handle attached to a stored account.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RestCredentials {
    pub username: String,
    #[serde(default)]
    pub auth_token: String,
}

impl RestCredentials {
    pub fn new<S: Into<String>>(username: S, auth_token: S) -> Self {
        Self { username: username.into(), auth_token: auth_token.into() }
    }

    /// A blank bearer token means the account was signed out or never finished signing in.
    pub fn has_valid_credentials(&self) -> bool {
        !self.auth_token.trim().is_empty()
    }

    pub fn bearer_token(&self) -> &str { &self.auth_token }
}

impl fmt::Debug for RestCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestCredentials")
            .field("username", &self.username)
            .field("auth_token", &if self.auth_token.is_empty() { "<empty>" } else { "<redacted>" })
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub credentials: RestCredentials,
}

impl Account {
    pub fn new<S: Into<String>>(username: S, auth_token: S) -> Self {
        let username = username.into();
        Self {
            credentials: RestCredentials::new(username.clone(), auth_token.into()),
            username,
            email: None,
            default: false,
        }
    }

    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }
}

/// Read-only access to persisted accounts.
pub trait AccountLookup: Send + Sync {
    fn default_account(&self) -> Option<Account>;
}

use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use super::account::{Account, AccountLookup};
use crate::error::{AppError, AppResult};

fn pick_default(accounts: &[Account]) -> Option<Account> {
    accounts.iter().find(|a| a.default).cloned()
}

/// Accounts held in memory; used by embedders that own persistence themselves.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<Vec<Account>>,
}

impl InMemoryAccountStore {
    pub fn with_accounts(accounts: Vec<Account>) -> Self {
        Self { accounts: RwLock::new(accounts) }
    }

    /// Insert or replace by username.
    pub fn insert(&self, account: Account) {
        let mut accounts = self.accounts.write();
        if let Some(existing) = accounts.iter_mut().find(|a| a.username == account.username) {
            *existing = account;
        } else {
            accounts.push(account);
        }
    }

    /// Mark `username` as the only default account. Returns false if it is unknown.
    pub fn set_default(&self, username: &str) -> bool {
        let mut accounts = self.accounts.write();
        if !accounts.iter().any(|a| a.username == username) {
            return false;
        }
        for a in accounts.iter_mut() {
            a.default = a.username == username;
        }
        true
    }

    pub fn remove(&self, username: &str) -> Option<Account> {
        let mut accounts = self.accounts.write();
        let idx = accounts.iter().position(|a| a.username == username)?;
        Some(accounts.remove(idx))
    }

    pub fn len(&self) -> usize { self.accounts.read().len() }

    pub fn is_empty(&self) -> bool { self.accounts.read().is_empty() }
}

impl AccountLookup for InMemoryAccountStore {
    fn default_account(&self) -> Option<Account> {
        pick_default(&self.accounts.read())
    }
}

/// Accounts read once from a JSON array on disk.
#[derive(Debug)]
pub struct JsonAccountStore {
    path: PathBuf,
    accounts: Vec<Account>,
}

impl JsonAccountStore {
    /// A missing file yields an empty store; a malformed one is an error.
    pub fn load(path: &Path) -> AppResult<Self> {
        let accounts = match std::fs::read_to_string(path) {
            Ok(text) if text.trim().is_empty() => Vec::new(),
            Ok(text) => serde_json::from_str::<Vec<Account>>(&text).map_err(|e| {
                AppError::io("invalid_accounts_file".to_string(), format!("{}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(target: "pushauth::identity", "accounts file {} not found; no stored accounts", path.display());
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(target: "pushauth::identity", "loaded {} account(s) from {}", accounts.len(), path.display());
        Ok(Self { path: path.to_path_buf(), accounts })
    }

    pub fn path(&self) -> &Path { &self.path }

    pub fn accounts(&self) -> &[Account] { &self.accounts }
}

impl AccountLookup for JsonAccountStore {
    fn default_account(&self) -> Option<Account> {
        pick_default(&self.accounts)
    }
}

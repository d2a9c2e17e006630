//! Stored accounts and the credential context an authorization request runs under.
//! Keep the public surface thin and split implementation across sub-modules.

mod account;
mod context;
mod store;

pub use account::{Account, AccountLookup, RestCredentials};
pub use context::{CredentialContext, resolve_context};
pub use store::{InMemoryAccountStore, JsonAccountStore};

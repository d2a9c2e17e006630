//! Authorization flow tests with stubbed account lookup and remote collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use pushauth::error::{AppError, AppResult};
use pushauth::identity::{Account, CredentialContext, InMemoryAccountStore, RestCredentials};
use pushauth::remote::{AuthorizationRemote, RemoteError, RemoteFactory};
use pushauth::PushAuthenticationService;

// Remote that answers per token, optionally after a delay, and records what it was sent.
#[derive(Default)]
struct StubRemote {
    outcomes: HashMap<String, Result<(), RemoteError>>,
    fallback: Option<Result<(), RemoteError>>,
    delays: HashMap<String, Duration>,
    seen: Mutex<Vec<String>>,
}

impl StubRemote {
    fn always(result: Result<(), RemoteError>) -> Self {
        Self { fallback: Some(result), ..Default::default() }
    }

    fn seen(&self) -> Vec<String> { self.seen.lock().clone() }
}

#[async_trait]
impl AuthorizationRemote for StubRemote {
    async fn authorize_login(&self, token: &str) -> Result<(), RemoteError> {
        self.seen.lock().push(token.to_string());
        if let Some(d) = self.delays.get(token) {
            tokio::time::sleep(*d).await;
        }
        self.outcomes
            .get(token)
            .cloned()
            .or_else(|| self.fallback.clone())
            .unwrap_or_else(|| Err(RemoteError::Transport("no stubbed outcome".into())))
    }
}

// Factory that hands out one shared remote and remembers which context asked for it.
struct StubFactory {
    remote: Arc<StubRemote>,
    requested: Mutex<Vec<CredentialContext>>,
    fail: bool,
}

impl StubFactory {
    fn new(remote: StubRemote) -> Self {
        Self { remote: Arc::new(remote), requested: Mutex::new(Vec::new()), fail: false }
    }

    fn failing() -> Self {
        Self { fail: true, ..Self::new(StubRemote::default()) }
    }

    fn requested(&self) -> Vec<CredentialContext> { self.requested.lock().clone() }

    fn hand_out(&self, ctx: CredentialContext) -> AppResult<Arc<dyn AuthorizationRemote>> {
        self.requested.lock().push(ctx);
        if self.fail {
            return Err(AppError::transport("client_build_failed", "stub refused"));
        }
        Ok(self.remote.clone())
    }
}

impl RemoteFactory for StubFactory {
    fn authenticated(&self, credentials: &RestCredentials) -> AppResult<Arc<dyn AuthorizationRemote>> {
        self.hand_out(CredentialContext::Authenticated(credentials.clone()))
    }

    fn anonymous(&self) -> AppResult<Arc<dyn AuthorizationRemote>> {
        self.hand_out(CredentialContext::Anonymous)
    }
}

fn rejected() -> RemoteError {
    RemoteError::Rejected { status: 403, code: "invalid_token".into(), message: "expired".into() }
}

#[tokio::test]
async fn no_stored_account_uses_anonymous_and_succeeds() {
    let accounts = InMemoryAccountStore::default();
    let factory = StubFactory::new(StubRemote::always(Ok(())));
    let svc = PushAuthenticationService::new(&accounts, &factory);

    assert_eq!(svc.context(), &CredentialContext::Anonymous);
    assert_eq!(factory.requested(), vec![CredentialContext::Anonymous]);
    assert!(svc.authorize_login("push-123").await);
    assert_eq!(factory.remote.seen(), vec!["push-123".to_string()]);
}

#[tokio::test]
async fn account_without_credentials_still_uses_anonymous() {
    let accounts = InMemoryAccountStore::with_accounts(vec![Account::new("ann", "").as_default()]);
    let factory = StubFactory::new(StubRemote::always(Ok(())));
    let svc = PushAuthenticationService::new(&accounts, &factory);

    assert_eq!(svc.context(), &CredentialContext::Anonymous);
    assert_eq!(factory.requested(), vec![CredentialContext::Anonymous]);
}

#[tokio::test]
async fn authenticated_context_with_network_error_reports_false() {
    let accounts = InMemoryAccountStore::with_accounts(vec![Account::new("ann", "oauth-tok").as_default()]);
    let factory = StubFactory::new(StubRemote::always(Err(RemoteError::Transport("connection reset".into()))));
    let svc = PushAuthenticationService::new(&accounts, &factory);

    let expected = CredentialContext::Authenticated(RestCredentials::new("ann", "oauth-tok"));
    assert_eq!(svc.context(), &expected);
    assert_eq!(factory.requested(), vec![expected]);
    assert!(!svc.authorize_login("push-123").await);
}

#[tokio::test]
async fn rejection_reports_false() {
    let accounts = InMemoryAccountStore::default();
    let factory = StubFactory::new(StubRemote::always(Err(rejected())));
    let svc = PushAuthenticationService::new(&accounts, &factory);
    assert!(!svc.authorize_login("stale").await);
}

#[tokio::test]
async fn empty_token_is_forwarded_verbatim() {
    let accounts = InMemoryAccountStore::default();
    let factory = StubFactory::new(StubRemote::always(Err(rejected())));
    let svc = PushAuthenticationService::new(&accounts, &factory);

    assert!(!svc.authorize_login("").await);
    assert_eq!(factory.remote.seen(), vec![String::new()]);
}

#[tokio::test]
async fn factory_failure_reports_false_without_calling_remote() {
    let accounts = InMemoryAccountStore::default();
    let factory = StubFactory::failing();
    let svc = PushAuthenticationService::new(&accounts, &factory);

    assert!(!svc.has_remote());
    assert!(!svc.authorize_login("push-123").await);

    let (tx, rx) = oneshot::channel();
    svc.authorize_login_with("push-123", move |ok| { let _ = tx.send(ok); })
        .expect("runtime available")
        .await
        .unwrap();
    assert!(!rx.await.unwrap());
    assert!(factory.remote.seen().is_empty());
}

#[tokio::test]
async fn callback_fires_exactly_once_after_round_trip() {
    let accounts = InMemoryAccountStore::default();
    let mut remote = StubRemote::always(Ok(()));
    remote.delays.insert("slow".into(), Duration::from_millis(20));
    let factory = StubFactory::new(remote);
    let svc = PushAuthenticationService::new(&accounts, &factory);

    let calls = Arc::new(AtomicUsize::new(0));
    let outcome = Arc::new(Mutex::new(None));
    let (c, o) = (calls.clone(), outcome.clone());
    let handle = svc.authorize_login_with("slow", move |ok| {
        c.fetch_add(1, Ordering::SeqCst);
        *o.lock() = Some(ok);
    });
    handle.expect("runtime available").await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(*outcome.lock(), Some(true));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_requests_do_not_cross_talk() {
    let accounts = InMemoryAccountStore::default();
    let mut remote = StubRemote::default();
    remote.outcomes.insert("good".into(), Ok(()));
    remote.outcomes.insert("bad".into(), Err(rejected()));
    // The successful request finishes last
    remote.delays.insert("good".into(), Duration::from_millis(30));
    let factory = StubFactory::new(remote);
    let svc = Arc::new(PushAuthenticationService::new(&accounts, &factory));

    let (tx_good, rx_good) = oneshot::channel();
    let (tx_bad, rx_bad) = oneshot::channel();
    let h1 = svc.authorize_login_with("good", move |ok| { let _ = tx_good.send(ok); }).expect("runtime available");
    let h2 = svc.authorize_login_with("bad", move |ok| { let _ = tx_bad.send(ok); }).expect("runtime available");
    let (r1, r2) = futures::future::join(h1, h2).await;
    r1.unwrap();
    r2.unwrap();

    assert!(rx_good.await.unwrap());
    assert!(!rx_bad.await.unwrap());

    let (a, b) = futures::future::join(svc.authorize_login("good"), svc.authorize_login("bad")).await;
    assert!(a);
    assert!(!b);
}

#[tokio::test]
async fn context_is_fixed_at_construction() {
    let accounts = InMemoryAccountStore::default();
    let factory = StubFactory::new(StubRemote::always(Ok(())));
    let svc = PushAuthenticationService::new(&accounts, &factory);

    // Signing in afterwards does not change an existing service
    accounts.insert(Account::new("ann", "oauth-tok").as_default());
    assert!(svc.authorize_login("push-1").await);
    assert_eq!(svc.context(), &CredentialContext::Anonymous);
    assert_eq!(factory.requested().len(), 1);

    let fresh = PushAuthenticationService::new(&accounts, &factory);
    assert!(fresh.context().is_authenticated());
}

struct PanickingRemote;

#[async_trait]
impl AuthorizationRemote for PanickingRemote {
    async fn authorize_login(&self, _token: &str) -> Result<(), RemoteError> {
        panic!("remote blew up");
    }
}

#[tokio::test]
async fn panicking_remote_still_completes_with_false() {
    let svc = PushAuthenticationService::with_remote(CredentialContext::Anonymous, Some(Arc::new(PanickingRemote)));

    let calls = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = oneshot::channel();
    let c = calls.clone();
    let handle = svc.authorize_login_with("push-1", move |ok| {
        c.fetch_add(1, Ordering::SeqCst);
        let _ = tx.send(ok);
    });
    handle.expect("runtime available").await.unwrap();

    assert!(!rx.await.unwrap());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

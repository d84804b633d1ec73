//! End-to-end controller flows against in-memory doubles.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use metering_demo_core::errors::StoreResult;

use metering_demo_core::storage::keys;
use metering_demo_core::testing::{
    MockIdentityProvider, RecordingSurface, SequencePpidGenerator, UnavailableStore,
};
use metering_demo_core::{
    DemoError, DemoPhase, InMemoryStore, KeyValueStore, MeteringDemo, Ppid, SignOutPolicy,
    SignOutStatus, StoreError,
};

struct Harness {
    store: Arc<InMemoryStore>,
    surface: Arc<RecordingSurface>,
    provider: Arc<MockIdentityProvider>,
    demo: MeteringDemo,
}

fn harness(store: InMemoryStore, provider: MockIdentityProvider) -> Harness {
    let store = Arc::new(store);
    let surface = Arc::new(RecordingSurface::new());
    let provider = Arc::new(provider.with_store_probe(store.clone()));
    let demo = MeteringDemo::new(store.clone(), surface.clone(), provider.clone());
    Harness {
        store,
        surface,
        provider,
        demo,
    }
}

fn populated_store() -> InMemoryStore {
    InMemoryStore::with_entries([
        (keys::PPID, "ppid1"),
        (keys::REGISTRATION_TIMESTAMP, "1700000000"),
        (keys::USERNAME, "alice"),
    ])
}

#[test]
fn test_empty_store_get_ppid_persists_returned_value() {
    let h = harness(InMemoryStore::new(), MockIdentityProvider::new());
    let demo = h
        .demo
        .with_generator(Arc::new(SequencePpidGenerator::new([482_913])));

    assert_eq!(demo.phase().unwrap(), DemoPhase::Unregistered);

    let ppid = demo.get_ppid().unwrap();
    assert_eq!(ppid.as_str(), "ppid482913");
    assert_eq!(
        h.store.get(keys::PPID).unwrap().as_deref(),
        Some("ppid482913")
    );
    assert_eq!(demo.phase().unwrap(), DemoPhase::Registered);
    assert_eq!(h.surface.displayed_ppid(), Some(ppid));
}

#[test]
fn test_get_ppid_is_stable_until_reset() {
    let h = harness(InMemoryStore::new(), MockIdentityProvider::new());

    let first = h.demo.get_ppid().unwrap();
    for _ in 0..5 {
        assert_eq!(h.demo.get_ppid().unwrap(), first);
    }
    assert!(Ppid::parse(first.as_str()).is_ok());
}

#[tokio::test]
async fn test_fetch_metering_state_reads_populated_store() {
    let h = harness(populated_store(), MockIdentityProvider::new());

    let state = h.demo.fetch_metering_state().await.unwrap();

    assert_eq!(state.id.as_str(), "ppid1");
    assert_eq!(
        state.registration_timestamp.as_ref().map(|t| t.as_str()),
        Some("1700000000")
    );
    assert_eq!(h.surface.greetings(), vec!["👋 Hello, alice!".to_string()]);

    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"id": "ppid1", "registrationTimestamp": "1700000000"})
    );
}

#[tokio::test]
async fn test_fetch_metering_state_on_empty_store_creates_ppid() {
    let h = harness(InMemoryStore::new(), MockIdentityProvider::new());

    let state = h.demo.fetch_metering_state().await.unwrap();

    assert!(h.store.contains_key(keys::PPID));
    assert!(state.registration_timestamp.is_none());
    let json = serde_json::to_value(&state).unwrap();
    assert!(json.get("registrationTimestamp").is_none());
}

#[tokio::test]
async fn test_reset_clears_keys_before_sign_out() {
    let h = harness(populated_store(), MockIdentityProvider::new());

    let outcome = h.demo.reset().await.unwrap();

    assert_eq!(outcome.sign_out, SignOutStatus::SignedOut);
    assert!(outcome.signed_out());
    assert!(h.store.is_empty());
    assert_eq!(h.provider.sign_out_calls(), 1);
    // Nothing left in the store by the time sign-out was requested
    assert_eq!(
        h.provider.keys_present_at_sign_out(),
        vec![Vec::<String>::new()]
    );
    assert_eq!(h.surface.reload_count(), 1);
    assert_eq!(h.demo.phase().unwrap(), DemoPhase::Unregistered);
}

#[tokio::test]
async fn test_reload_waits_for_sign_out_to_settle() {
    let (provider, gate) = MockIdentityProvider::gated();
    let h = harness(populated_store(), provider);
    let (surface, store, provider) = (&h.surface, &h.store, &h.provider);

    let driver = async move {
        tokio::task::yield_now().await;
        assert_eq!(provider.sign_out_calls(), 1);
        assert!(store.is_empty());
        assert_eq!(surface.reload_count(), 0);
        gate.succeed();
    };

    let (outcome, ()) = tokio::join!(h.demo.reset(), driver);

    assert!(outcome.unwrap().signed_out());
    assert_eq!(h.surface.reload_count(), 1);
}

#[tokio::test]
async fn test_unsettled_sign_out_never_reloads() {
    let (provider, _gate) = MockIdentityProvider::gated();
    let h = harness(populated_store(), provider);

    let result = tokio::time::timeout(Duration::from_millis(50), h.demo.reset()).await;

    assert!(result.is_err());
    assert!(h.store.is_empty());
    assert_eq!(h.surface.reload_count(), 0);
}

#[tokio::test]
async fn test_failed_sign_out_reloads_by_default() {
    let h = harness(populated_store(), MockIdentityProvider::failing("popup closed"));
    assert_eq!(h.demo.sign_out_policy(), SignOutPolicy::ReloadOnSettle);

    let outcome = h.demo.reset().await.unwrap();

    assert_eq!(outcome.sign_out, SignOutStatus::Failed("popup closed".into()));
    assert!(!outcome.signed_out());
    assert!(h.store.is_empty());
    assert_eq!(h.surface.reload_count(), 1);
}

#[tokio::test]
async fn test_failed_sign_out_with_reload_on_success_policy() {
    let h = harness(populated_store(), MockIdentityProvider::failing("network"));
    let demo = h
        .demo
        .with_sign_out_policy(SignOutPolicy::ReloadOnSuccess);

    let err = demo.reset().await.unwrap_err();

    assert!(matches!(err, DemoError::SignOut(ref e) if e.message == "network"));
    // Keys are already gone; only the reload is skipped
    assert!(h.store.is_empty());
    assert_eq!(h.surface.reload_count(), 0);
}

#[tokio::test]
async fn test_gated_sign_out_failure_still_reloads() {
    let (provider, gate) = MockIdentityProvider::gated();
    let h = harness(populated_store(), provider);
    let surface = &h.surface;

    let driver = async move {
        tokio::task::yield_now().await;
        assert_eq!(surface.reload_count(), 0);
        gate.fail("revoked");
    };

    let (outcome, ()) = tokio::join!(h.demo.reset(), driver);

    assert_eq!(
        outcome.unwrap().sign_out,
        SignOutStatus::Failed("revoked".into())
    );
    assert_eq!(h.surface.reload_count(), 1);
}

#[tokio::test]
async fn test_reset_then_get_ppid_registers_again() {
    let h = harness(populated_store(), MockIdentityProvider::new());
    let demo = h
        .demo
        .with_generator(Arc::new(SequencePpidGenerator::new([77])));

    demo.reset().await.unwrap();
    assert_eq!(demo.get_ppid().unwrap().as_str(), "ppid77");
    assert!(!h.store.contains_key(keys::USERNAME));
}

#[test]
fn test_open_paywall_twice_is_noop() {
    let h = harness(InMemoryStore::new(), MockIdentityProvider::new());

    h.demo.open_paywall();
    h.demo.open_paywall();

    assert_eq!(h.surface.paywall_open_count(), 1);
}

#[tokio::test]
async fn test_paywall_closes_after_reload() {
    let h = harness(populated_store(), MockIdentityProvider::new());
    h.demo.open_paywall();

    h.demo.reset().await.unwrap();
    h.demo.open_paywall();

    assert_eq!(h.surface.paywall_open_count(), 2);
}

#[test]
fn test_unavailable_store_fails_get_ppid() {
    let surface = Arc::new(RecordingSurface::new());
    let demo = MeteringDemo::new(
        Arc::new(UnavailableStore),
        surface.clone(),
        Arc::new(MockIdentityProvider::new()),
    );

    let err = demo.get_ppid().unwrap_err();

    assert!(matches!(err, DemoError::Store(StoreError::Unavailable(_))));
    assert!(surface.displayed_ppid().is_none());
}

#[tokio::test]
async fn test_unavailable_store_fails_reset_without_sign_out() {
    let surface = Arc::new(RecordingSurface::new());
    let provider = Arc::new(MockIdentityProvider::new());
    let demo = MeteringDemo::new(Arc::new(UnavailableStore), surface.clone(), provider.clone());

    assert!(demo.reset().await.is_err());
    assert_eq!(provider.sign_out_calls(), 0);
    assert_eq!(surface.reload_count(), 0);
}

/// In-memory store whose `remove` fails on one given call.
struct FailingRemoveStore {
    inner: InMemoryStore,
    fail_on: usize,
    removes: AtomicUsize,
}

impl KeyValueStore for FailingRemoveStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        if self.removes.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
            return Err(StoreError::Unavailable("quota exceeded".into()));
        }
        self.inner.remove(key)
    }
}

#[tokio::test]
async fn test_reset_attempts_every_key_when_one_delete_fails() {
    let store = Arc::new(FailingRemoveStore {
        inner: populated_store(),
        fail_on: 2,
        removes: AtomicUsize::new(0),
    });
    let surface = Arc::new(RecordingSurface::new());
    let provider = Arc::new(MockIdentityProvider::new());
    let demo = MeteringDemo::new(store.clone(), surface.clone(), provider.clone());

    let err = demo.reset().await.unwrap_err();

    assert!(matches!(err, DemoError::Store(StoreError::Unavailable(_))));
    assert_eq!(store.removes.load(Ordering::SeqCst), 3);
    assert_eq!(store.get(keys::PPID).unwrap(), None);
    assert_eq!(store.get(keys::USERNAME).unwrap(), None);
    assert_eq!(provider.sign_out_calls(), 0);
    assert_eq!(surface.reload_count(), 0);
}

#[tokio::test]
async fn test_snapshot_reflects_store() {
    let h = harness(populated_store(), MockIdentityProvider::new());

    let snapshot = h.demo.snapshot().unwrap();
    assert_eq!(snapshot.phase, DemoPhase::Registered);
    assert_eq!(snapshot.ppid.map(String::from).as_deref(), Some("ppid1"));
    assert_eq!(snapshot.username.as_deref(), Some("alice"));

    h.demo.reset().await.unwrap();
    let snapshot = h.demo.snapshot().unwrap();
    assert_eq!(snapshot.phase, DemoPhase::Unregistered);
    assert!(snapshot.ppid.is_none());
    assert!(snapshot.registration_timestamp.is_none());
}

//! Mock implementations of the controller's injected capabilities.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::errors::{SignOutError, StoreError, StoreResult};
use crate::identity_provider::IdentityProvider;
use crate::ppid::{Ppid, PpidGenerator};
use crate::storage::{keys, KeyValueStore};
use crate::surface::{greeting, DemoSurface};

/// Something the controller did to the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    ShowPpid(Ppid),
    Greet(String),
    ShowControls,
    OpenPaywall,
    Reload,
}

/// Surface double that records every call.
#[derive(Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<SurfaceEvent>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, event: SurfaceEvent) {
        // A poisoned lock only happens after a test already panicked.
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// The PPID most recently written to the PPID element.
    pub fn displayed_ppid(&self) -> Option<Ppid> {
        self.events().into_iter().rev().find_map(|e| match e {
            SurfaceEvent::ShowPpid(ppid) => Some(ppid),
            _ => None,
        })
    }

    pub fn ppid_visible(&self) -> bool {
        self.displayed_ppid().is_some()
    }

    /// Greeting lines, rendered.
    pub fn greetings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SurfaceEvent::Greet(name) => Some(greeting(&name)),
                _ => None,
            })
            .collect()
    }

    pub fn controls_visible(&self) -> bool {
        self.events().contains(&SurfaceEvent::ShowControls)
    }

    pub fn paywall_open_count(&self) -> usize {
        self.count(&SurfaceEvent::OpenPaywall)
    }

    pub fn reload_count(&self) -> usize {
        self.count(&SurfaceEvent::Reload)
    }

    fn count(&self, wanted: &SurfaceEvent) -> usize {
        self.events().iter().filter(|e| *e == wanted).count()
    }
}

impl DemoSurface for RecordingSurface {
    fn show_ppid(&self, ppid: &Ppid) {
        self.record(SurfaceEvent::ShowPpid(ppid.clone()));
    }

    fn greet(&self, username: &str) {
        self.record(SurfaceEvent::Greet(username.to_string()));
    }

    fn show_controls(&self) {
        self.record(SurfaceEvent::ShowControls);
    }

    fn open_paywall(&self) {
        if !self.is_paywall_open() {
            self.record(SurfaceEvent::OpenPaywall);
        }
    }

    /// Open since the last reload.
    fn is_paywall_open(&self) -> bool {
        self.events()
            .iter()
            .rev()
            .take_while(|e| **e != SurfaceEvent::Reload)
            .any(|e| *e == SurfaceEvent::OpenPaywall)
    }

    fn reload(&self) {
        self.record(SurfaceEvent::Reload);
    }
}

/// Releases a pending sign-out created by [`MockIdentityProvider::gated`].
pub struct SignOutGate {
    tx: oneshot::Sender<Result<(), SignOutError>>,
}

impl SignOutGate {
    pub fn succeed(self) {
        let _ = self.tx.send(Ok(()));
    }

    pub fn fail(self, message: impl Into<String>) {
        let _ = self.tx.send(Err(SignOutError::new(message)));
    }
}

/// Scripted identity provider.
///
/// Settles immediately with a fixed outcome, or stays pending until a
/// [`SignOutGate`] is released.
pub struct MockIdentityProvider {
    outcome: Result<(), SignOutError>,
    gate: Mutex<Option<oneshot::Receiver<Result<(), SignOutError>>>>,
    calls: AtomicUsize,
    probe: Option<Arc<dyn KeyValueStore + Send + Sync>>,
    keys_at_sign_out: Mutex<Vec<Vec<String>>>,
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockIdentityProvider {
    /// Provider whose sign-out always succeeds.
    pub fn new() -> Self {
        Self::with_outcome(Ok(()))
    }

    /// Provider whose sign-out always rejects.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_outcome(Err(SignOutError::new(message)))
    }

    /// Provider whose first sign-out waits for the returned gate.
    pub fn gated() -> (Self, SignOutGate) {
        let (tx, rx) = oneshot::channel();
        let provider = Self::new();
        *provider.gate.lock().unwrap_or_else(|p| p.into_inner()) = Some(rx);
        (provider, SignOutGate { tx })
    }

    fn with_outcome(outcome: Result<(), SignOutError>) -> Self {
        Self {
            outcome,
            gate: Mutex::new(None),
            calls: AtomicUsize::new(0),
            probe: None,
            keys_at_sign_out: Mutex::new(Vec::new()),
        }
    }

    /// Record which demo keys are still present in `store` whenever sign-out
    /// is requested.
    pub fn with_store_probe(mut self, store: Arc<dyn KeyValueStore + Send + Sync>) -> Self {
        self.probe = Some(store);
        self
    }

    pub fn sign_out_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Demo keys seen by the probe, one entry per sign-out call.
    pub fn keys_present_at_sign_out(&self) -> Vec<Vec<String>> {
        self.keys_at_sign_out
            .lock()
            .map(|k| k.clone())
            .unwrap_or_default()
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl IdentityProvider for MockIdentityProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn sign_out(&self) -> Result<(), SignOutError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(store) = &self.probe {
            let present = keys::ALL
                .iter()
                .filter(|key| matches!(store.get(key), Ok(Some(_))))
                .map(|key| key.to_string())
                .collect();
            if let Ok(mut seen) = self.keys_at_sign_out.lock() {
                seen.push(present);
            }
        }

        let gate = self.gate.lock().ok().and_then(|mut g| g.take());
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(SignOutError::new("sign-out gate dropped"))),
            None => self.outcome.clone(),
        }
    }
}

/// Generator that replays a fixed list of numbers, then wraps around.
pub struct SequencePpidGenerator {
    numbers: Mutex<VecDeque<u32>>,
}

impl SequencePpidGenerator {
    /// Numbers above the PPID range are clamped to it.
    pub fn new(numbers: impl IntoIterator<Item = u32>) -> Self {
        let numbers: VecDeque<u32> = numbers.into_iter().collect();
        Self {
            numbers: Mutex::new(if numbers.is_empty() {
                VecDeque::from([0])
            } else {
                numbers
            }),
        }
    }
}

impl PpidGenerator for SequencePpidGenerator {
    fn generate(&self) -> Ppid {
        let mut numbers = self.numbers.lock().unwrap_or_else(|p| p.into_inner());
        let n = numbers.pop_front().unwrap_or_default();
        numbers.push_back(n);
        Ppid::from_number_saturating(n)
    }
}

/// Store that fails every operation, like disabled browser storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        Err(StoreError::Unavailable("storage disabled".into()))
    }

    fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
        Err(StoreError::Unavailable("storage disabled".into()))
    }

    fn remove(&self, _key: &str) -> StoreResult<()> {
        Err(StoreError::Unavailable("storage disabled".into()))
    }
}

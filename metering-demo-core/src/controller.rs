//! Demo state controller.
//!
//! Helps demonstrate metering functionality. Publishers shouldn't use this in
//! production: the state lives on the reader's device, is unauthenticated and
//! can be forged trivially.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use metering_demo_core::storage::InMemoryStore;
//! use metering_demo_core::testing::{MockIdentityProvider, RecordingSurface};
//! use metering_demo_core::MeteringDemo;
//!
//! # async fn example() -> metering_demo_core::Result<()> {
//! let demo = MeteringDemo::new(
//!     Arc::new(InMemoryStore::new()),
//!     Arc::new(RecordingSurface::new()),
//!     Arc::new(MockIdentityProvider::new()),
//! );
//!
//! let first = demo.get_ppid()?;
//! assert_eq!(demo.get_ppid()?, first);
//!
//! demo.reset().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::errors::{DemoError, Result};
use crate::identity_provider::{IdentityProvider, SignOutPolicy};
use crate::models::{
    DemoPhase, DemoSnapshot, MeteringState, RegistrationTimestamp, ResetOutcome, SignOutStatus,
};
use crate::ppid::{Ppid, PpidGenerator, RandomPpidGenerator};
use crate::storage::{keys, KeyValueStore};
use crate::surface::DemoSurface;

/// Owns the demo's session values and the paywall toggle.
pub struct MeteringDemo {
    store: Arc<dyn KeyValueStore>,
    surface: Arc<dyn DemoSurface>,
    provider: Arc<dyn IdentityProvider>,
    generator: Arc<dyn PpidGenerator>,
    policy: SignOutPolicy,
}

impl MeteringDemo {
    /// Create a controller using the default random PPID generator.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        surface: Arc<dyn DemoSurface>,
        provider: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            store,
            surface,
            provider,
            generator: Arc::new(RandomPpidGenerator),
            policy: SignOutPolicy::default(),
        }
    }

    /// Replace the PPID generator.
    pub fn with_generator(mut self, generator: Arc<dyn PpidGenerator>) -> Self {
        self.generator = generator;
        self
    }

    /// Choose what happens when sign-out is rejected during a reset.
    pub fn with_sign_out_policy(mut self, policy: SignOutPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn sign_out_policy(&self) -> SignOutPolicy {
        self.policy
    }

    /// Sets up controls for the metering demo.
    pub fn setup_controls(&self) {
        self.surface.show_controls();
    }

    /// Returns a new PPID suitable for demo purposes. Nothing is stored.
    pub fn create_ppid(&self) -> Ppid {
        self.generator.generate()
    }

    /// Returns the stored PPID, creating and persisting one if needed.
    ///
    /// Also renders the PPID on the surface. Idempotent until [`reset`].
    ///
    /// [`reset`]: MeteringDemo::reset
    pub fn get_ppid(&self) -> Result<Ppid> {
        let ppid = match self.stored_ppid()? {
            Some(ppid) => ppid,
            None => {
                let ppid = self.create_ppid();
                self.store.set(keys::PPID, ppid.as_str())?;
                tracing::debug!(key = keys::PPID, "stored new PPID");
                ppid
            }
        };

        tracing::info!("Metering PPID: {}", ppid);
        self.surface.show_ppid(&ppid);

        Ok(ppid)
    }

    /// Opens the paywall. Calling it again has no further effect.
    pub fn open_paywall(&self) {
        if self.surface.is_paywall_open() {
            tracing::debug!("paywall already open");
            return;
        }
        self.surface.open_paywall();
    }

    /// Returns the user's metering state, including when the user registered.
    ///
    /// Resolves without any I/O beyond the local store. Greets the user when
    /// a username is stored.
    pub async fn fetch_metering_state(&self) -> Result<MeteringState> {
        if let Some(username) = self.store.get(keys::USERNAME)? {
            if !username.is_empty() {
                self.surface.greet(&username);
            }
        }

        let id = self.get_ppid()?;
        let registration_timestamp = self.registration_timestamp()?;

        Ok(MeteringState {
            id,
            registration_timestamp,
        })
    }

    /// Resets the metering demo.
    ///
    /// Local keys are deleted before sign-out is requested. The reload runs
    /// only after sign-out settles; if the provider never settles, neither
    /// does this future. When sign-out is rejected the outcome depends on the
    /// configured [`SignOutPolicy`].
    pub async fn reset(&self) -> Result<ResetOutcome> {
        self.store.remove_all(&keys::ALL)?;
        tracing::info!("cleared metering demo state");

        let sign_out = match self.provider.sign_out().await {
            Ok(()) => SignOutStatus::SignedOut,
            Err(e) => match self.policy {
                SignOutPolicy::ReloadOnSettle => {
                    tracing::warn!(
                        provider = self.provider.name(),
                        "sign-out failed, reloading anyway: {}",
                        e
                    );
                    SignOutStatus::Failed(e.message)
                }
                SignOutPolicy::ReloadOnSuccess => {
                    tracing::warn!(provider = self.provider.name(), "sign-out failed: {}", e);
                    return Err(DemoError::SignOut(e));
                }
            },
        };

        self.surface.reload();

        Ok(ResetOutcome { sign_out })
    }

    /// Current lifecycle phase. Never creates a PPID.
    pub fn phase(&self) -> Result<DemoPhase> {
        Ok(if self.stored_ppid()?.is_some() {
            DemoPhase::Registered
        } else {
            DemoPhase::Unregistered
        })
    }

    /// Everything currently stored. Never creates a PPID.
    pub fn snapshot(&self) -> Result<DemoSnapshot> {
        let ppid = self.stored_ppid()?;
        let phase = if ppid.is_some() {
            DemoPhase::Registered
        } else {
            DemoPhase::Unregistered
        };

        Ok(DemoSnapshot {
            phase,
            ppid,
            registration_timestamp: self.registration_timestamp()?,
            username: self.store.get(keys::USERNAME)?.filter(|u| !u.is_empty()),
        })
    }

    fn registration_timestamp(&self) -> Result<Option<RegistrationTimestamp>> {
        Ok(self
            .store
            .get(keys::REGISTRATION_TIMESTAMP)?
            .map(RegistrationTimestamp))
    }

    /// Stored PPID, treating empty or malformed values as absent.
    fn stored_ppid(&self) -> Result<Option<Ppid>> {
        match self.store.get(keys::PPID)? {
            None => Ok(None),
            Some(raw) if raw.is_empty() => Ok(None),
            Some(raw) => match Ppid::parse(&raw) {
                Ok(ppid) => Ok(Some(ppid)),
                Err(_) => {
                    tracing::warn!(value = %raw, "ignoring malformed stored PPID");
                    Ok(None)
                }
            },
        }
    }
}

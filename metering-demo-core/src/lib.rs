//! Metering Demo Core Library
//!
//! Shared logic for the metering demos (CLI and Web). This crate owns the
//! demo controller, PPID generation, persisted demo state and the lint
//! validation task. Browser and terminal specifics are injected through the
//! [`KeyValueStore`], [`DemoSurface`] and [`IdentityProvider`] traits.

pub mod config;
pub mod controller;
pub mod errors;
pub mod identity_provider;
pub mod models;
pub mod ppid;
pub mod storage;
pub mod surface;
pub mod testing;

#[cfg(not(target_arch = "wasm32"))]
pub mod validation;

pub use config::DemoConfig;
pub use controller::MeteringDemo;
pub use errors::{DemoError, SignOutError, StoreError, ValidationError};
pub use identity_provider::{IdentityProvider, SignOutPolicy};
pub use models::{
    DemoPhase, DemoSnapshot, MeteringState, RegistrationTimestamp, ResetOutcome, SignOutStatus,
};
pub use ppid::{Ppid, PpidGenerator, RandomPpidGenerator};
pub use storage::{FileStore, InMemoryStore, KeyValueStore};
pub use surface::DemoSurface;

/// Result type for demo operations
pub type Result<T> = errors::Result<T>;

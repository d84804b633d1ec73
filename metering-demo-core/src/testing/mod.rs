//! Testing utilities for metering demo applications.
//!
//! Test doubles for every seam of [`MeteringDemo`](crate::MeteringDemo), so
//! controller behaviour can be exercised without a browser or a sign-in
//! provider.
//!
//! # Usage
//!
//! ```rust
//! use metering_demo_core::testing::{MockIdentityProvider, RecordingSurface};
//!
//! // Sign-out that stays pending until the test releases it
//! let (provider, gate) = MockIdentityProvider::gated();
//! let surface = RecordingSurface::new();
//! # drop((provider, gate, surface));
//! ```

pub mod mocks;

pub use mocks::{
    MockIdentityProvider, RecordingSurface, SequencePpidGenerator, SignOutGate, SurfaceEvent,
    UnavailableStore,
};

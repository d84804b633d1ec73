//! Third-party sign-in provider seam.

use async_trait::async_trait;

use crate::errors::SignOutError;

/// Identity provider the demo signs out of during a reset.
///
/// Browser promises are not `Send`, so on wasm32 the returned future is not
/// required to be either.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait IdentityProvider {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Sign the current user out. Completes when the provider has settled.
    async fn sign_out(&self) -> Result<(), SignOutError>;
}

/// What a reset does when sign-out is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignOutPolicy {
    /// Reload once sign-out settles, whether it fulfilled or rejected.
    #[default]
    ReloadOnSettle,
    /// Reload only after a successful sign-out; a rejection is returned to
    /// the caller instead.
    ReloadOnSuccess,
}

impl SignOutPolicy {
    pub fn from_reload_on_failure(reload_on_failure: bool) -> Self {
        if reload_on_failure {
            SignOutPolicy::ReloadOnSettle
        } else {
            SignOutPolicy::ReloadOnSuccess
        }
    }
}

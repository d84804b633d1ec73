//! Sign-out through the registration wall library loaded on the page.

use async_trait::async_trait;
use metering_demo_core::{IdentityProvider, SignOutError};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::utils;

#[wasm_bindgen]
extern "C" {
    /// `self.GaaMeteringRegwall.signOut()`; throws if the library is missing.
    #[wasm_bindgen(catch, js_namespace = GaaMeteringRegwall, js_name = signOut)]
    fn regwall_sign_out() -> Result<js_sys::Promise, JsValue>;
}

/// Identity provider backed by `GaaMeteringRegwall`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegwallIdentityProvider;

#[async_trait(?Send)]
impl IdentityProvider for RegwallIdentityProvider {
    fn name(&self) -> &str {
        "GaaMeteringRegwall"
    }

    async fn sign_out(&self) -> Result<(), SignOutError> {
        let promise = regwall_sign_out().map_err(|e| SignOutError::new(utils::describe(&e)))?;
        JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(|e| SignOutError::new(utils::describe(&e)))
    }
}

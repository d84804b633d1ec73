//! JavaScript API for the metering demo page.
//!
//! ```js
//! const demo = new MeteringDemo();
//! demo.setupControls();
//! const state = await demo.fetchMeteringState();
//! ```

use std::rc::Rc;
use std::sync::Arc;

use metering_demo_core::config::SignInConfig;
use metering_demo_core::{DemoConfig, MeteringDemo, PpidGenerator, RandomPpidGenerator};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::future_to_promise;

use crate::dom::{DomSurface, RESET_SELECTOR};
use crate::errors::WebError;
use crate::regwall::RegwallIdentityProvider;
use crate::storage::LocalStorageStore;
use crate::utils;

/// Metering demo bound to `localStorage`, the page DOM and the regwall.
#[wasm_bindgen(js_name = MeteringDemo)]
pub struct WasmMeteringDemo {
    inner: Rc<MeteringDemo>,
    surface: Arc<DomSurface>,
    sign_in: SignInConfig,
}

impl WasmMeteringDemo {
    fn build(config: &DemoConfig) -> Result<WasmMeteringDemo, WebError> {
        let surface = Arc::new(DomSurface::new()?);
        let demo = MeteringDemo::new(
            Arc::new(LocalStorageStore),
            surface.clone(),
            Arc::new(RegwallIdentityProvider),
        )
        .with_sign_out_policy(config.sign_out_policy());

        Ok(Self {
            inner: Rc::new(demo),
            surface,
            sign_in: config.sign_in.clone(),
        })
    }
}

#[wasm_bindgen(js_class = MeteringDemo)]
impl WasmMeteringDemo {
    /// Create a demo with the default configuration
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WasmMeteringDemo, JsValue> {
        Ok(Self::build(&DemoConfig::default())?)
    }

    /// Create a demo from a (partial) configuration object, e.g.
    /// `{reload_on_sign_out_failure: false}`
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<WasmMeteringDemo, JsValue> {
        let config: DemoConfig = if config.is_undefined() || config.is_null() {
            DemoConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| WebError::Options(e.to_string()))?
        };
        Ok(Self::build(&config)?)
    }

    /// Wire the reset control, reveal the controls and fix up nav links
    #[wasm_bindgen(js_name = setupControls)]
    pub fn setup_controls(&self) -> Result<(), JsValue> {
        let button = self
            .surface
            .reset_button()
            .ok_or_else(|| WebError::MissingElement(RESET_SELECTOR.to_string()))?;

        let demo = self.inner.clone();
        let on_click = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            let demo = demo.clone();
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = demo.reset().await {
                    utils::error(&format!("Failed to reset metering demo: {}", e));
                }
            });
        });
        button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        // The page owns the listener from here on
        on_click.forget();

        self.inner.setup_controls();
        Ok(())
    }

    /// Clear demo state, sign out and reload. Resolves once sign-out settles,
    /// to `true` if the user was signed out.
    #[wasm_bindgen(js_name = resetMeteringDemo)]
    pub fn reset_metering_demo(&self) -> js_sys::Promise {
        let demo = self.inner.clone();
        future_to_promise(async move {
            let outcome = demo.reset().await.map_err(WebError::from)?;
            Ok(JsValue::from_bool(outcome.signed_out()))
        })
    }

    /// A new PPID suitable for demo purposes. Nothing is stored.
    #[wasm_bindgen(js_name = createPpid)]
    pub fn create_ppid() -> String {
        RandomPpidGenerator.generate().into()
    }

    /// The stored PPID, created on first use
    #[wasm_bindgen(js_name = getPpid)]
    pub fn get_ppid(&self) -> Result<String, JsValue> {
        Ok(self.inner.get_ppid().map_err(WebError::from)?.into())
    }

    #[wasm_bindgen(js_name = openPaywall)]
    pub fn open_paywall(&self) {
        self.inner.open_paywall();
    }

    /// Resolves to `{id, registrationTimestamp?}`
    #[wasm_bindgen(js_name = fetchMeteringState)]
    pub fn fetch_metering_state(&self) -> js_sys::Promise {
        let demo = self.inner.clone();
        future_to_promise(async move {
            let state = demo
                .fetch_metering_state()
                .await
                .map_err(WebError::from)?;
            serde_wasm_bindgen::to_value(&state).map_err(|e| utils::js_error(&e.to_string()))
        })
    }

    /// `"unregistered"` or `"registered"`
    pub fn phase(&self) -> Result<String, JsValue> {
        Ok(self.inner.phase().map_err(WebError::from)?.to_string())
    }

    /// Client ID this demo was configured with
    #[wasm_bindgen(js_name = signInClientId)]
    pub fn sign_in_client_id(&self) -> String {
        self.sign_in.client_id.clone()
    }

    /// Redirect URI this demo was configured with
    #[wasm_bindgen(js_name = signInRedirectUri)]
    pub fn sign_in_redirect_uri(&self) -> String {
        self.sign_in.redirect_uri.clone()
    }

    /// Default Google Sign-In client ID for the metering demo
    #[wasm_bindgen(js_name = googleSignInClientId)]
    pub fn google_sign_in_client_id() -> String {
        DemoConfig::default().sign_in.client_id
    }

    /// Default redirect after signing in
    #[wasm_bindgen(js_name = googleSignInRedirectUri)]
    pub fn google_sign_in_redirect_uri() -> String {
        DemoConfig::default().sign_in.redirect_uri
    }
}

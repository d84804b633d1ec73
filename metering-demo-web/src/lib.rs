#![cfg(target_arch = "wasm32")]
//! Metering Demo Web - WebAssembly bindings
//!
//! Exposes the metering demo controller to the demo page, backed by
//! `localStorage`, the page DOM and `GaaMeteringRegwall` sign-out.

use wasm_bindgen::prelude::*;

mod demo;
mod dom;
mod errors;
mod regwall;
mod storage;
mod utils;

pub use demo::WasmMeteringDemo;
pub use dom::{replace_query, DomSurface, CONTROLS_CLASS, PAYWALL_CLASS};
pub use errors::WebError;
pub use regwall::RegwallIdentityProvider;
pub use storage::LocalStorageStore;

/// Initialize the WASM module
///
/// This should be called once when the module is loaded.
#[wasm_bindgen(start)]
pub fn init() {
    utils::set_panic_hook();
    utils::log("Metering demo WASM module initialized");
}

/// Get the version of the metering demo WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

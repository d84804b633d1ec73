//! Errors raised by the browser bindings.

use metering_demo_core::DemoError;
use wasm_bindgen::JsValue;

use crate::utils;

#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("no window object")]
    NoWindow,

    #[error("no document")]
    NoDocument,

    /// A required page element is missing
    #[error("element not found: {0}")]
    MissingElement(String),

    #[error("invalid options: {0}")]
    Options(String),

    #[error(transparent)]
    Demo(#[from] DemoError),
}

impl From<WebError> for JsValue {
    fn from(err: WebError) -> Self {
        utils::js_error(&err.to_string())
    }
}

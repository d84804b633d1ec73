//! The demo page as a [`DemoSurface`].

use metering_demo_core::surface::greeting;
use metering_demo_core::{DemoSurface, Ppid};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlAnchorElement, HtmlElement};

use crate::errors::WebError;
use crate::utils;

pub const PPID_SELECTOR: &str = "#metering-controls .ppid";
pub const RESET_SELECTOR: &str = "#metering-controls .reset-metering-demo";
pub const NAV_BUTTON_SELECTOR: &str = "header .nav-button";

/// Class on `<html>` that opens the paywall
pub const PAYWALL_CLASS: &str = "open-paywall";
/// Class on `<body>` that reveals the demo controls
pub const CONTROLS_CLASS: &str = "metering";

pub struct DomSurface {
    document: Document,
}

impl DomSurface {
    pub fn new() -> Result<Self, WebError> {
        let window = web_sys::window().ok_or(WebError::NoWindow)?;
        let document = window.document().ok_or(WebError::NoDocument)?;
        Ok(Self { document })
    }

    fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    /// The reset control, if the page has one.
    pub fn reset_button(&self) -> Option<Element> {
        self.query(RESET_SELECTOR)
    }

    /// Carry the page's query string over to the nav buttons.
    fn update_nav_buttons(&self) {
        let search = self
            .document
            .location()
            .and_then(|l| l.search().ok())
            .unwrap_or_default();

        let Ok(buttons) = self.document.query_selector_all(NAV_BUTTON_SELECTOR) else {
            return;
        };
        for i in 0..buttons.length() {
            let Some(button) = buttons
                .item(i)
                .and_then(|node| node.dyn_into::<HtmlAnchorElement>().ok())
            else {
                continue;
            };
            button.set_href(&replace_query(&button.href(), &search));
        }
    }
}

/// Replace everything from the first `?` with `search`.
///
/// Hrefs without a query are left alone.
pub fn replace_query(href: &str, search: &str) -> String {
    match href.find('?') {
        Some(idx) => format!("{}{}", &href[..idx], search),
        None => href.to_string(),
    }
}

impl DemoSurface for DomSurface {
    fn show_ppid(&self, ppid: &Ppid) {
        utils::log(&format!("Metering PPID: {}", ppid));

        let Some(el) = self
            .query(PPID_SELECTOR)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            utils::warn(&format!("{} not found", PPID_SELECTOR));
            return;
        };
        el.set_text_content(Some(ppid.as_str()));
        if el.style().set_property("display", "block").is_err() {
            utils::warn("could not show the PPID element");
        }
    }

    fn greet(&self, username: &str) {
        utils::log(&greeting(username));
    }

    fn show_controls(&self) {
        if let Some(body) = self.document.body() {
            if body.class_list().add_1(CONTROLS_CLASS).is_err() {
                utils::warn("could not reveal metering controls");
            }
        }
        self.update_nav_buttons();
    }

    fn open_paywall(&self) {
        if let Some(root) = self.document.document_element() {
            if root.class_list().add_1(PAYWALL_CLASS).is_err() {
                utils::warn("could not open the paywall");
            }
        }
    }

    fn is_paywall_open(&self) -> bool {
        self.document
            .document_element()
            .map(|root| root.class_list().contains(PAYWALL_CLASS))
            .unwrap_or(false)
    }

    fn reload(&self) {
        let reloaded = self.document.location().map(|l| l.reload());
        if !matches!(reloaded, Some(Ok(()))) {
            utils::error("failed to reload the page");
        }
    }
}

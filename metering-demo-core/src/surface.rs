//! UI surface the demo controller renders into.

use crate::ppid::Ppid;

/// Everything the controller needs from a user interface.
///
/// Implemented by the DOM (web demo), the terminal (CLI) and a recording
/// double for tests. Methods take `&self`; implementations keep their own
/// interior state.
pub trait DemoSurface {
    /// Log the PPID, write it into the PPID element and make that element
    /// visible.
    fn show_ppid(&self, ppid: &Ppid);

    /// Greet a returning user by name.
    fn greet(&self, username: &str);

    /// Reveal the demo controls (reset button etc.).
    fn show_controls(&self);

    /// Mark the paywall open. Must be idempotent.
    fn open_paywall(&self);

    fn is_paywall_open(&self) -> bool;

    /// Reload the whole UI from storage.
    fn reload(&self);
}

/// Greeting emitted for a stored username.
pub fn greeting(username: &str) -> String {
    format!("👋 Hello, {}!", username)
}

//! Terminal rendition of the demo page.
//!
//! The paywall flag outlives a single invocation through a marker file in
//! the storage directory; a reload clears it, like a page reload drops the
//! document class.

use std::path::{Path, PathBuf};

use colored::Colorize;
use metering_demo_core::surface::greeting;
use metering_demo_core::{DemoSurface, Ppid};

use crate::ui;

const PAYWALL_MARKER: &str = ".paywall_open";

pub struct TerminalSurface {
    storage_dir: PathBuf,
    quiet: bool,
}

impl TerminalSurface {
    pub fn new(storage_dir: &Path) -> Self {
        Self {
            storage_dir: storage_dir.to_path_buf(),
            quiet: false,
        }
    }

    /// Suppress rendering, e.g. when stdout carries JSON.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn marker(&self) -> PathBuf {
        self.storage_dir.join(PAYWALL_MARKER)
    }
}

impl DemoSurface for TerminalSurface {
    fn show_ppid(&self, ppid: &Ppid) {
        if !self.quiet {
            ui::key_value("PPID", ppid.as_str());
        }
    }

    fn greet(&self, username: &str) {
        if !self.quiet {
            println!("{}", greeting(username).bold());
        }
    }

    fn show_controls(&self) {
        if self.quiet {
            return;
        }
        ui::header("Metering Demo Controls");
        ui::key_value("reset", "clear demo state and sign out");
        ui::key_value("paywall", "open the paywall");
        ui::key_value("status", "show what is stored");
    }

    fn open_paywall(&self) {
        if let Err(e) = std::fs::create_dir_all(&self.storage_dir)
            .and_then(|_| std::fs::write(self.marker(), b""))
        {
            tracing::warn!("failed to persist paywall state: {}", e);
        }
        if !self.quiet {
            println!("{}", "🔒 Paywall opened".yellow().bold());
        }
    }

    fn is_paywall_open(&self) -> bool {
        self.marker().exists()
    }

    fn reload(&self) {
        let marker = self.marker();
        if marker.exists() {
            if let Err(e) = std::fs::remove_file(&marker) {
                tracing::warn!("failed to clear paywall state: {}", e);
            }
        }
        if !self.quiet {
            ui::info("Demo reloaded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paywall_survives_new_surface_until_reload() {
        let dir = tempfile::tempdir().unwrap();
        let surface = TerminalSurface::new(dir.path()).quiet(true);
        assert!(!surface.is_paywall_open());

        surface.open_paywall();
        assert!(TerminalSurface::new(dir.path()).is_paywall_open());

        surface.reload();
        assert!(!surface.is_paywall_open());
    }
}

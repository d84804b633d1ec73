//! CLI command implementations

pub mod lint;
pub mod new_ppid;
pub mod paywall;
pub mod ppid;
pub mod register;
pub mod reset;
pub mod state;
pub mod status;

use std::path::Path;
use std::sync::Arc;

use metering_demo_core::{DemoConfig, FileStore, MeteringDemo};

use crate::session::LocalSessionProvider;
use crate::terminal::TerminalSurface;

/// A controller wired to the storage directory, plus handles on its parts.
pub struct DemoContext {
    pub demo: MeteringDemo,
    pub store: Arc<FileStore>,
    pub surface: Arc<TerminalSurface>,
    pub session: Arc<LocalSessionProvider>,
}

/// Build the controller for `storage_dir`.
pub fn demo_context(storage_dir: &Path, config: &DemoConfig, quiet: bool) -> DemoContext {
    let store = Arc::new(FileStore::new(storage_dir));
    let surface = Arc::new(TerminalSurface::new(storage_dir).quiet(quiet));
    let session = Arc::new(LocalSessionProvider::new(storage_dir));

    let demo = MeteringDemo::new(store.clone(), surface.clone(), session.clone())
        .with_sign_out_policy(config.sign_out_policy());

    DemoContext {
        demo,
        store,
        surface,
        session,
    }
}

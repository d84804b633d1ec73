//! Ppid command - get or create the stored PPID

use anyhow::Result;
use std::path::Path;

use metering_demo_core::DemoConfig;

use crate::ui;

pub async fn run(storage_dir: &Path, config: &DemoConfig, verbose: bool) -> Result<()> {
    let ctx = super::demo_context(storage_dir, config, false);
    let was_registered = ctx.demo.snapshot()?.ppid.is_some();

    // The surface prints the PPID
    ctx.demo.get_ppid()?;

    if !was_registered {
        ui::success("Created and stored a new PPID");
    }
    if verbose {
        ui::key_value("Store", &ctx.store.path().display().to_string());
    }

    Ok(())
}

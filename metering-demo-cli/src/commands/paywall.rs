//! Paywall command - open the paywall

use anyhow::Result;
use std::path::Path;

use metering_demo_core::{DemoConfig, DemoSurface};

use crate::ui;

pub async fn run(storage_dir: &Path, config: &DemoConfig, _verbose: bool) -> Result<()> {
    let ctx = super::demo_context(storage_dir, config, false);

    if ctx.surface.is_paywall_open() {
        ui::info("Paywall is already open");
    }
    ctx.demo.open_paywall();

    Ok(())
}

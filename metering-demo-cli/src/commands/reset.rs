//! Reset command - clear demo state, sign out and reload

use anyhow::Result;
use std::path::Path;

use metering_demo_core::{DemoConfig, SignOutStatus};

use crate::ui;

pub async fn run(storage_dir: &Path, config: &DemoConfig, yes: bool, _verbose: bool) -> Result<()> {
    if !yes {
        if !ui::is_interactive() {
            anyhow::bail!("Refusing to reset without confirmation; pass --yes");
        }
        if !ui::confirm("Reset the metering demo and sign out?", false)? {
            ui::info("Reset cancelled");
            return Ok(());
        }
    }

    let ctx = super::demo_context(storage_dir, config, false);

    let spinner = ui::spinner("Signing out...");
    let result = ctx.demo.reset().await;
    spinner.finish_and_clear();

    let outcome = result?;
    match outcome.sign_out {
        SignOutStatus::SignedOut => ui::success("Metering demo reset"),
        SignOutStatus::Failed(message) => {
            ui::warning(&format!("Sign-out failed: {}", message));
            ui::success("Metering demo reset anyway");
        }
    }

    ctx.demo.setup_controls();

    Ok(())
}

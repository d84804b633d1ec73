//! Status command - show everything the demo keeps locally

use anyhow::Result;
use std::path::Path;

use metering_demo_core::{DemoConfig, DemoPhase, DemoSurface};

use crate::ui;

pub async fn run(storage_dir: &Path, config: &DemoConfig, verbose: bool) -> Result<()> {
    let ctx = super::demo_context(storage_dir, config, false);
    let snapshot = ctx.demo.snapshot()?;

    ui::header("Metering Demo Status");
    ui::key_value("Phase", &snapshot.phase.to_string());
    ui::key_value(
        "PPID",
        snapshot
            .ppid
            .as_ref()
            .map(|p| p.as_str())
            .unwrap_or("(none)"),
    );
    ui::key_value(
        "Registered",
        &snapshot
            .registration_timestamp
            .as_ref()
            .map(|ts| match ts.to_datetime() {
                Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                None => ts.to_string(),
            })
            .unwrap_or_else(|| "(no)".to_string()),
    );
    ui::key_value("Username", snapshot.username.as_deref().unwrap_or("(none)"));

    match ctx.session.current() {
        Ok(Some(session)) => ui::key_value(
            "Session",
            &format!("signed in {}", session.signed_in_at.format("%Y-%m-%d %H:%M:%S UTC")),
        ),
        Ok(None) => ui::key_value("Session", "signed out"),
        Err(e) => ui::warning(&format!("Could not read session: {}", e)),
    }

    let paywall = if ctx.surface.is_paywall_open() {
        "open"
    } else {
        "closed"
    };
    ui::key_value("Paywall", paywall);

    if verbose {
        ui::separator();
        ui::key_value("Storage", &storage_dir.display().to_string());
        ui::key_value("Store file", &ctx.store.path().display().to_string());
        ui::key_value("Sign-in client", &config.sign_in.client_id);
        ui::key_value("Sign-in redirect", &config.sign_in.redirect_uri);
    }

    if snapshot.phase == DemoPhase::Unregistered {
        println!();
        ui::info("Run 'metering-demo ppid' or 'metering-demo register' to get started");
    }

    Ok(())
}

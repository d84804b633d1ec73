//! State command - fetch the metering state handed to the metering library

use anyhow::Result;
use std::path::Path;

use metering_demo_core::DemoConfig;

use crate::ui;

pub async fn run(storage_dir: &Path, config: &DemoConfig, json: bool, _verbose: bool) -> Result<()> {
    let ctx = super::demo_context(storage_dir, config, json);
    let state = ctx.demo.fetch_metering_state().await?;

    if json {
        ui::json(&serde_json::to_value(&state)?);
        return Ok(());
    }

    ui::header("Metering State");
    ui::key_value("id", state.id.as_str());
    match &state.registration_timestamp {
        Some(ts) => {
            let when = ts
                .to_datetime()
                .map(|dt| format!("{} ({})", ts, dt.format("%Y-%m-%d %H:%M:%S UTC")))
                .unwrap_or_else(|| ts.to_string());
            ui::key_value("registrationTimestamp", &when);
        }
        None => ui::key_value("registrationTimestamp", "(not registered)"),
    }

    Ok(())
}

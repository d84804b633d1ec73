//! Register command - simulate the sign-in/registration flow
//!
//! In the browser the registration wall writes the timestamp and username.
//! Here we write them directly and record a local sign-in session.

use anyhow::{bail, Result};
use std::path::Path;

use metering_demo_core::storage::keys;
use metering_demo_core::{DemoConfig, KeyValueStore, RegistrationTimestamp};

use crate::ui;

pub async fn run(
    storage_dir: &Path,
    config: &DemoConfig,
    username: Option<String>,
    timestamp: Option<String>,
    _verbose: bool,
) -> Result<()> {
    let timestamp = match timestamp {
        Some(value) if value.trim().is_empty() => bail!("Timestamp must not be empty"),
        Some(value) => RegistrationTimestamp::new(value.trim()),
        None => RegistrationTimestamp::now(),
    };
    let username = username.filter(|u| !u.trim().is_empty());

    let ctx = super::demo_context(storage_dir, config, false);
    ctx.store
        .set(keys::REGISTRATION_TIMESTAMP, timestamp.as_str())?;
    if let Some(name) = &username {
        ctx.store.set(keys::USERNAME, name)?;
    }
    ctx.session.sign_in(username.as_deref())?;
    tracing::info!(timestamp = %timestamp, "recorded registration");

    ctx.demo.get_ppid()?;
    ui::success("Registered");
    if let Some(name) = &username {
        ui::key_value("Username", name);
    }
    ui::key_value("Timestamp", timestamp.as_str());

    Ok(())
}

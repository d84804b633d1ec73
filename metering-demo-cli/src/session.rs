//! Local sign-in session, the CLI's stand-in for the sign-in provider.
//!
//! `register` records a session file; signing out deletes it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use metering_demo_core::{IdentityProvider, SignOutError};

/// A recorded sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: Option<String>,
    pub signed_in_at: DateTime<Utc>,
}

pub struct LocalSessionProvider {
    storage_dir: PathBuf,
}

impl LocalSessionProvider {
    const FILE_NAME: &'static str = "session.json";

    pub fn new(storage_dir: &Path) -> Self {
        Self {
            storage_dir: storage_dir.to_path_buf(),
        }
    }

    fn path(&self) -> PathBuf {
        self.storage_dir.join(Self::FILE_NAME)
    }

    /// Record a sign-in, replacing any previous session.
    pub fn sign_in(&self, username: Option<&str>) -> anyhow::Result<Session> {
        let session = Session {
            username: username.map(str::to_string),
            signed_in_at: Utc::now(),
        };
        std::fs::create_dir_all(&self.storage_dir)?;
        std::fs::write(self.path(), serde_json::to_string_pretty(&session)?)?;
        Ok(session)
    }

    /// The current session, if one is recorded.
    pub fn current(&self) -> anyhow::Result<Option<Session>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }
}

#[async_trait]
impl IdentityProvider for LocalSessionProvider {
    fn name(&self) -> &str {
        "local-session"
    }

    async fn sign_out(&self) -> Result<(), SignOutError> {
        let path = self.path();
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!("signed out of local session");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no local session to sign out of");
                Ok(())
            }
            Err(e) => Err(SignOutError::new(format!(
                "failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

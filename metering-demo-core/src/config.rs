//! Demo configuration stored next to the demo data.
//!
//! Every field has a default, so a missing or partial `config.json` is fine.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{DemoError, Result};
use crate::identity_provider::SignOutPolicy;

/// Google Sign-In client ID for the metering demo.
pub const GOOGLE_SIGN_IN_CLIENT_ID: &str =
    "520465458218-e9vp957krfk2r0i4ejeh6aklqm7c25p4.apps.googleusercontent.com";

/// Google Sign-In redirect URI, where users are sent after signing in.
pub const GOOGLE_SIGN_IN_REDIRECT_URI: &str = "https://scenic-2017.appspot.com/gsi-redirect";

/// Top-level demo configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoConfig {
    #[serde(default)]
    pub sign_in: SignInConfig,
    /// Whether a reset still reloads when sign-out is rejected
    #[serde(default = "default_true")]
    pub reload_on_sign_out_failure: bool,
    #[serde(default)]
    pub lint: LintConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            sign_in: SignInConfig::default(),
            reload_on_sign_out_failure: true,
            lint: LintConfig::default(),
        }
    }
}

/// Sign-in provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInConfig {
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
}

impl Default for SignInConfig {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            redirect_uri: default_redirect_uri(),
        }
    }
}

/// Validation task settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintConfig {
    /// Glob patterns; a leading `!` excludes
    #[serde(default = "default_globs")]
    pub globs: Vec<String>,
    /// Linter plugins passed through to the checker
    #[serde(default = "default_plugins")]
    pub plugins: Vec<String>,
    /// Program and leading arguments used to invoke the linter
    #[serde(default = "default_command")]
    pub command: Vec<String>,
    /// Watch mode polling interval
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            globs: default_globs(),
            plugins: default_plugins(),
            command: default_command(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_client_id() -> String {
    GOOGLE_SIGN_IN_CLIENT_ID.to_string()
}

fn default_redirect_uri() -> String {
    GOOGLE_SIGN_IN_REDIRECT_URI.to_string()
}

fn default_globs() -> Vec<String> {
    vec!["src/**/*.js".to_string(), "!node_modules/**".to_string()]
}

fn default_plugins() -> Vec<String> {
    vec!["eslint-plugin-google-camelcase".to_string()]
}

fn default_command() -> Vec<String> {
    vec!["npx".to_string(), "eslint".to_string()]
}

fn default_poll_interval_ms() -> u64 {
    500
}

impl DemoConfig {
    /// File name used inside the storage directory.
    pub const FILE_NAME: &'static str = "config.json";

    /// Load configuration, falling back to defaults when no file exists.
    pub fn load(storage_dir: &Path) -> Result<Self> {
        let path = storage_dir.join(Self::FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)
            .map_err(|e| DemoError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let config = serde_json::from_str(&contents)
            .map_err(|e| DemoError::Config(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    pub fn save(&self, storage_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(storage_dir)
            .map_err(|e| DemoError::Config(format!("failed to create storage dir: {}", e)))?;
        let path = storage_dir.join(Self::FILE_NAME);
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| DemoError::Config(format!("failed to serialize config: {}", e)))?;
        std::fs::write(&path, contents)
            .map_err(|e| DemoError::Config(format!("failed to write {}: {}", path.display(), e)))?;
        Ok(())
    }

    pub fn sign_out_policy(&self) -> SignOutPolicy {
        SignOutPolicy::from_reload_on_failure(self.reload_on_sign_out_failure)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lint.command.is_empty() {
            return Err(DemoError::Config("lint.command must not be empty".into()));
        }
        if self.lint.poll_interval_ms == 0 {
            return Err(DemoError::Config(
                "lint.poll_interval_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

//! Common test utilities for metering-demo-cli integration tests

use assert_cmd::Command;
use tempfile::TempDir;

/// Test context with a temporary storage directory
#[allow(dead_code)]
pub struct TestContext {
    pub temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// The CLI binary pointed at this context's storage directory
    pub fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("metering-demo").unwrap();
        cmd.env("METERING_DEMO_DIR", self.temp_dir.path())
            .env("NO_COLOR", "1")
            .env_remove("CLICOLOR_FORCE");
        cmd
    }

    /// Stored demo values as raw JSON
    pub fn stored(&self) -> serde_json::Value {
        let path = self.temp_dir.path().join("local_storage.json");
        match std::fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json).unwrap(),
            Err(_) => serde_json::json!({}),
        }
    }
}

/// Pull the first `ppid<digits>` token out of command output
#[allow(dead_code)]
pub fn extract_ppid(output: &str) -> Option<String> {
    output.split_whitespace().find_map(|word| {
        let digits = word.strip_prefix("ppid")?;
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            Some(word.to_string())
        } else {
            None
        }
    })
}

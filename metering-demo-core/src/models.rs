//! Data models for the metering demo

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ppid::Ppid;

/// When the demo user registered, as stored by the registration flow.
///
/// The value is opaque: usually Unix seconds, but any string is kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationTimestamp(pub String);

impl RegistrationTimestamp {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Timestamp for "now" in Unix seconds.
    pub fn now() -> Self {
        Self(Utc::now().timestamp().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The value as Unix seconds, if it is an integer.
    pub fn unix_seconds(&self) -> Option<i64> {
        self.0.trim().parse().ok()
    }

    /// The value as a UTC date, if it is an integer number of seconds.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        self.unix_seconds()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }
}

impl fmt::Display for RegistrationTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metering state handed to the metering library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeteringState {
    pub id: Ppid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_timestamp: Option<RegistrationTimestamp>,
}

/// Registration lifecycle of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemoPhase {
    /// No PPID persisted
    Unregistered,
    /// PPID persisted; timestamp and username may be present
    Registered,
}

impl fmt::Display for DemoPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemoPhase::Unregistered => write!(f, "unregistered"),
            DemoPhase::Registered => write!(f, "registered"),
        }
    }
}

/// Read-only view of everything the demo keeps in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoSnapshot {
    pub phase: DemoPhase,
    pub ppid: Option<Ppid>,
    pub registration_timestamp: Option<RegistrationTimestamp>,
    pub username: Option<String>,
}

/// How the sign-out step of a reset ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignOutStatus {
    SignedOut,
    /// The provider rejected; the message is kept for reporting.
    Failed(String),
}

/// Result of a completed reset. A completed reset has always reloaded the
/// surface; a reset that does not reload returns an error instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetOutcome {
    pub sign_out: SignOutStatus,
}

impl ResetOutcome {
    pub fn signed_out(&self) -> bool {
        self.sign_out == SignOutStatus::SignedOut
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metering_state_json_shape() {
        let state = MeteringState {
            id: Ppid::parse("ppid1").unwrap(),
            registration_timestamp: Some(RegistrationTimestamp::new("1700000000")),
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "ppid1", "registrationTimestamp": "1700000000"})
        );

        let unregistered = MeteringState {
            id: Ppid::parse("ppid2").unwrap(),
            registration_timestamp: None,
        };
        let json = serde_json::to_value(&unregistered).unwrap();
        assert_eq!(json, serde_json::json!({"id": "ppid2"}));
    }

    #[test]
    fn test_registration_timestamp_conversions() {
        let ts = RegistrationTimestamp::new("1700000000");
        assert_eq!(ts.unix_seconds(), Some(1_700_000_000));
        assert_eq!(
            ts.to_datetime().unwrap().to_rfc3339(),
            "2023-11-14T22:13:20+00:00"
        );

        let opaque = RegistrationTimestamp::new("Tue Nov 14 2023");
        assert_eq!(opaque.unix_seconds(), None);
        assert!(opaque.to_datetime().is_none());
        assert_eq!(opaque.to_string(), "Tue Nov 14 2023");
    }
}

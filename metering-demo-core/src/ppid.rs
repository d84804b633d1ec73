//! Publisher Provided IDs (PPIDs) for the metering demo.
//!
//! A PPID stands in for a subscriber identity. It is `"ppid"` followed by an
//! integer in `[0, 999999]`, drawn from a non-cryptographic random source.
//! Collisions are possible and not checked.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use crate::errors::DemoError;

/// Prefix shared by every PPID.
pub const PPID_PREFIX: &str = "ppid";

/// Upper bound of the numeric part (inclusive).
pub const PPID_MAX: u32 = 999_999;

/// A validated Publisher Provided ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ppid(String);

impl Ppid {
    /// Build a PPID from its numeric part.
    pub fn from_number(n: u32) -> Result<Self, DemoError> {
        if n > PPID_MAX {
            return Err(DemoError::InvalidPpid(format!("{}{}", PPID_PREFIX, n)));
        }
        Ok(Self(format!("{}{}", PPID_PREFIX, n)))
    }

    /// Build a PPID, clamping the number into range.
    pub fn from_number_saturating(n: u32) -> Self {
        Self(format!("{}{}", PPID_PREFIX, n.min(PPID_MAX)))
    }

    /// Parse a canonical PPID string.
    ///
    /// Leading zeros and signs are rejected so that the parsed value always
    /// displays as the exact input.
    pub fn parse(s: &str) -> Result<Self, DemoError> {
        let invalid = || DemoError::InvalidPpid(s.to_string());
        let digits = s.strip_prefix(PPID_PREFIX).ok_or_else(invalid)?;
        if digits.is_empty()
            || digits.len() > 6
            || !digits.bytes().all(|b| b.is_ascii_digit())
            || (digits.len() > 1 && digits.starts_with('0'))
        {
            return Err(invalid());
        }
        let n: u32 = digits.parse().map_err(|_| invalid())?;
        Self::from_number(n)
    }

    /// Numeric part of the PPID.
    pub fn number(&self) -> u32 {
        // Validated at construction.
        self.0[PPID_PREFIX.len()..].parse().unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ppid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Ppid {
    type Err = DemoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Ppid {
    type Error = DemoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Ppid> for String {
    fn from(ppid: Ppid) -> Self {
        ppid.0
    }
}

/// Source of fresh PPIDs.
pub trait PpidGenerator {
    fn generate(&self) -> Ppid;
}

/// Default generator: `"ppid" + floor(random() * 999999)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPpidGenerator;

impl PpidGenerator for RandomPpidGenerator {
    fn generate(&self) -> Ppid {
        Ppid::from_number_saturating(rand::thread_rng().gen_range(0..PPID_MAX))
    }
}

/// Generator driven by a caller-supplied seeded RNG.
///
/// Useful for reproducible demos.
pub struct SeededPpidGenerator<R: Rng> {
    rng: Mutex<R>,
}

impl<R: Rng> SeededPpidGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl<R: Rng> PpidGenerator for SeededPpidGenerator<R> {
    fn generate(&self) -> Ppid {
        let n = match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(0..PPID_MAX),
            Err(poisoned) => poisoned.into_inner().gen_range(0..PPID_MAX),
        };
        Ppid::from_number_saturating(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_parse_accepts_canonical_values() {
        assert_eq!(Ppid::parse("ppid0").unwrap().number(), 0);
        assert_eq!(Ppid::parse("ppid482913").unwrap().number(), 482_913);
        assert_eq!(Ppid::parse("ppid999999").unwrap().as_str(), "ppid999999");
    }

    #[test]
    fn test_parse_rejects_malformed_values() {
        for bad in [
            "",
            "ppid",
            "PPID12",
            "ppid-1",
            "ppid+1",
            "ppid007",
            "ppid1000000",
            "ppid12a",
            "id123",
            " ppid1",
        ] {
            assert!(Ppid::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_from_number_bounds() {
        assert!(Ppid::from_number(PPID_MAX).is_ok());
        assert!(Ppid::from_number(PPID_MAX + 1).is_err());
    }

    #[test]
    fn test_serde_uses_plain_string() {
        let ppid = Ppid::parse("ppid42").unwrap();
        assert_eq!(serde_json::to_string(&ppid).unwrap(), "\"ppid42\"");

        let bad: Result<Ppid, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_seeded_generator_is_reproducible() {
        let a = SeededPpidGenerator::new(StdRng::seed_from_u64(7));
        let b = SeededPpidGenerator::new(StdRng::seed_from_u64(7));
        for _ in 0..10 {
            assert_eq!(a.generate(), b.generate());
        }
    }

    #[test]
    fn test_random_generator_output_is_valid() {
        let generator = RandomPpidGenerator;
        for _ in 0..1000 {
            let ppid = generator.generate();
            assert!(Ppid::parse(ppid.as_str()).is_ok());
            assert!(ppid.number() < PPID_MAX);
        }
    }
}

//! Shared type definitions for the Microprediction SDK.
//!
//! These types are used by both the REST client and the response records.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

// ============================================================================
// WriteKey
// ============================================================================

/// Account credential used by mutating and account endpoints.
///
/// `Debug` output is redacted so the key does not end up in logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct WriteKey(String);

impl WriteKey {
    /// Wrap a write key, rejecting values that cannot be used as a path segment.
    pub fn new(key: impl Into<String>) -> Result<Self, InvalidWriteKey> {
        let key = key.into();
        if key.is_empty() {
            return Err(InvalidWriteKey("write key cannot be empty".to_string()));
        }
        if key.chars().any(|c| c.is_whitespace() || c == '/' || c == '?' || c == '#') {
            return Err(InvalidWriteKey(
                "write key contains whitespace or URL delimiters".to_string(),
            ));
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for WriteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tail: String = self
            .0
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        write!(f, "WriteKey(…{})", tail)
    }
}

/// Error returned by [`WriteKey::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid write key: {0}")]
pub struct InvalidWriteKey(pub String);

// ============================================================================
// Horizon
// ============================================================================

/// A `delay::stream` pair, as used in active submissions and performance keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Horizon {
    /// Delay in seconds
    pub delay: u64,
    /// Stream name
    pub name: String,
}

impl Horizon {
    pub fn new(delay: u64, name: impl Into<String>) -> Self {
        Self {
            delay,
            name: name.into(),
        }
    }
}

/// Error returned when a horizon key is not `delay::name`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid horizon '{0}': expected 'delay::name'")]
pub struct InvalidHorizon(pub String);

impl std::str::FromStr for Horizon {
    type Err = InvalidHorizon;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (delay, name) = s
            .split_once("::")
            .ok_or_else(|| InvalidHorizon(s.to_string()))?;
        let delay = delay
            .parse::<u64>()
            .map_err(|_| InvalidHorizon(s.to_string()))?;
        if name.is_empty() {
            return Err(InvalidHorizon(s.to_string()));
        }
        Ok(Self::new(delay, name))
    }
}

impl std::fmt::Display for Horizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.delay, self.name)
    }
}

impl Serialize for Horizon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Horizon {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_key_debug_is_redacted() {
        let key = WriteKey::new("c2f9a1b4e7d03866").unwrap();
        let debug = format!("{:?}", key);
        assert_eq!(debug, "WriteKey(…3866)");
        assert!(!debug.contains("c2f9"));
        assert_eq!(key.as_str(), "c2f9a1b4e7d03866");
    }

    #[test]
    fn test_write_key_rejects_bad_input() {
        assert!(WriteKey::new("").is_err());
        assert!(WriteKey::new("abc def").is_err());
        assert!(WriteKey::new("abc/def").is_err());
    }

    #[test]
    fn test_horizon_parse_and_display() {
        let horizon: Horizon = "310::die.json".parse().unwrap();
        assert_eq!(horizon, Horizon::new(310, "die.json"));
        assert_eq!(horizon.to_string(), "310::die.json");
    }

    #[test]
    fn test_horizon_keeps_colons_in_name() {
        let horizon: Horizon = "70::z1~c5_btc~3555.json".parse().unwrap();
        assert_eq!(horizon.delay, 70);
        assert_eq!(horizon.name, "z1~c5_btc~3555.json");

        let horizon: Horizon = "910::a::b".parse().unwrap();
        assert_eq!(horizon.name, "a::b");
    }

    #[test]
    fn test_horizon_rejects_bad_input() {
        assert!("die.json".parse::<Horizon>().is_err());
        assert!("soon::die.json".parse::<Horizon>().is_err());
        assert!("70::".parse::<Horizon>().is_err());
    }

    #[test]
    fn test_horizon_serde() {
        let horizon: Horizon = serde_json::from_str(r#""3555::cop.json""#).unwrap();
        assert_eq!(horizon, Horizon::new(3555, "cop.json"));
        assert_eq!(serde_json::to_string(&horizon).unwrap(), r#""3555::cop.json""#);
    }
}

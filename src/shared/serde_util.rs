//! Custom serde helpers for the service's wire formats.
//!
//! The service emits epoch times as float seconds and is loose about numbers,
//! sometimes sending them as strings.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::shared::lagged::{as_number, decode_epoch_seconds};

/// Deserializes float Unix seconds into `DateTime<Utc>`.
pub mod epoch_seconds {
    use super::*;
    use chrono::{DateTime, Utc};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        let seconds = as_number(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid timestamp: {}", raw)))?;
        decode_epoch_seconds(seconds)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid timestamp: {}", seconds)))
    }
}

/// Like [`epoch_seconds`], for optional fields. `null` maps to `None`.
pub mod epoch_seconds_opt {
    use super::*;
    use chrono::{DateTime, Utc};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        if raw.is_null() {
            return Ok(None);
        }
        let seconds = as_number(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid timestamp: {}", raw)))?;
        decode_epoch_seconds(seconds)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid timestamp: {}", seconds)))
    }
}

/// Optional `f64` that may arrive as a number or a numeric string.
pub mod lenient_f64_opt {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        if raw.is_null() {
            return Ok(None);
        }
        as_number(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid number: {}", raw)))
    }
}

/// Optional `u64` that may arrive as a number or a numeric string.
pub mod lenient_u64_opt {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        match &raw {
            Value::Null => Ok(None),
            Value::Number(n) => n
                .as_u64()
                .or_else(|| {
                    // `u64::MAX as f64` rounds up to 2^64, which is itself out of range.
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f < u64::MAX as f64)
                        .map(|f| f as u64)
                })
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("Invalid integer: {}", raw))),
            Value::String(s) => s
                .trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("Invalid integer: {}", raw))),
            _ => Err(serde::de::Error::custom(format!("Invalid integer: {}", raw))),
        }
    }
}

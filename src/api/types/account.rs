//! Account types for the Microprediction REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::shared::{serde_util, Horizon};

/// A single balance movement from GET /transactions/{write_key}.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Transaction {
    /// Stream the transaction settled on
    #[serde(default)]
    pub stream: Option<String>,
    /// Delay horizon in seconds
    #[serde(default, deserialize_with = "serde_util::lenient_u64_opt::deserialize")]
    pub delay: Option<u64>,
    /// Amount credited (negative when debited)
    #[serde(default, deserialize_with = "serde_util::lenient_f64_opt::deserialize")]
    pub amount: Option<f64>,
    /// Settlement time (epoch seconds on the wire)
    #[serde(default, deserialize_with = "serde_util::epoch_seconds_opt::deserialize")]
    pub epoch_time: Option<DateTime<Utc>>,
    /// Human-readable settlement time
    #[serde(default)]
    pub settlement_time: Option<String>,
    /// Any other fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Cumulative score per horizon, from GET /performance/{write_key}.
///
/// Keys are `delay::name` horizon strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Performance {
    pub entries: HashMap<String, f64>,
}

impl Performance {
    /// Sum over all horizons.
    pub fn total(&self) -> f64 {
        self.entries.values().sum()
    }

    /// Entries whose key parses as a [`Horizon`], sorted by horizon.
    pub fn by_horizon(&self) -> Vec<(Horizon, f64)> {
        let mut parsed: Vec<(Horizon, f64)> = self
            .entries
            .iter()
            .filter_map(|(key, score)| key.parse::<Horizon>().ok().map(|h| (h, *score)))
            .collect();
        parsed.sort_by(|a, b| a.0.cmp(&b.0));
        parsed
    }
}

//! Stream-level read types for the Microprediction REST API.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::shared::lagged::as_number;

/// Response for GET /sponsors/ (sponsor code → sponsor name).
pub type Sponsors = HashMap<String, String>;

/// Response for GET /budgets/ (stream name → budget).
pub type Budgets = HashMap<String, f64>;

/// Scores keyed by write-key code (or sponsor, for the overall board).
///
/// Response for GET /leaderboards/{name} and GET /overall/.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    pub entries: HashMap<String, f64>,
}

impl Leaderboard {
    pub fn get(&self, code: &str) -> Option<f64> {
        self.entries.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted best-first. Equal scores are ordered by name.
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .entries
            .iter()
            .map(|(name, score)| (name.as_str(), *score))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

/// Response for GET /live/summary::{name}.
///
/// The summary is a flat key/value document whose keys vary by stream, so it
/// is kept as a map with typed accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamSummary {
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl StreamSummary {
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.fields.get(key)
    }

    /// Numeric field, accepting numbers sent as strings.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(as_number)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }
}

/// Response for GET /cdf/{name}: the community distribution at a horizon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cdf {
    /// Abscissae
    #[serde(default)]
    pub x: Vec<f64>,
    /// Cumulative probabilities at each `x`
    #[serde(default)]
    pub y: Vec<f64>,
}

impl Cdf {
    /// `(x, y)` pairs. Extra entries on the longer side are dropped.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty()
    }
}

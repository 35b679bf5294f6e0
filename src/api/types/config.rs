//! Service configuration returned by `GET /config.json`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bootstrap configuration published by the service.
///
/// Fetch it once with `MicroClient::get_config` and pass it by reference
/// into the operations that depend on it (leaderboards, delayed values,
/// submissions). It is never stored globally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Delay horizons in seconds, e.g. `[70, 310, 910, 3555]`
    pub delays: Vec<u64>,
    /// Number of scenario values expected per submission
    pub num_predictions: usize,
    /// Minimum history length before a stream accepts predictions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_len: Option<usize>,
    /// Balance below which a write key is barred
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_balance: Option<f64>,
    /// Number of scenarios rewarded per settlement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_winners: Option<usize>,
    /// Everything else the service publishes
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl ServiceConfig {
    /// Whether `delay` is one of the configured horizons.
    pub fn has_delay(&self, delay: u64) -> bool {
        self.delays.contains(&delay)
    }

    /// Shortest configured delay.
    pub fn min_delay(&self) -> Option<u64> {
        self.delays.iter().copied().min()
    }
}

//! Shared utilities and types used by the API client and its response records.

pub mod lagged;
pub mod serde_util;
pub mod types;

// Re-export commonly used items
pub use lagged::{decode_epoch_seconds, decode_lagged, DecodeError, LaggedPoint, LaggedSeries, PairField};
pub use types::*;

//! # Microprediction Rust SDK
//!
//! A Rust SDK for the Microprediction stream API.
//!
//! ## Modules
//!
//! - [`api`]: REST API client for stream values, submissions and account data
//! - [`shared`]: Lagged-series decoding and shared types
//! - [`network`]: Default endpoint URL
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use microprediction::api::MicroClient;
//! use microprediction::network::DEFAULT_API_URL;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MicroClient::builder(DEFAULT_API_URL)
//!         .write_key("your-write-key")
//!         .build()?;
//!
//!     let config = client.get_config().await?;
//!     let lagged = client.get_lagged("die.json").await?;
//!     println!("{} lagged values, delays {:?}", lagged.len(), config.delays);
//!
//!     println!("Balance: {}", client.get_balance().await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Decoding Without the Client
//!
//! ```rust,ignore
//! use microprediction::shared::decode_lagged;
//!
//! let raw = serde_json::json!([[100, 5.0], [50, 2.5], [100, 9.0]]);
//! let series = decode_lagged(&raw)?;
//! assert_eq!(series.values(), vec![2.5, 5.0, 9.0]);
//! ```

// ============================================================================
// MODULES
// ============================================================================

/// Shared utilities and types.
/// Lagged-series decoding is always available, with or without `http`.
pub mod shared;

/// Network URL constants.
pub mod network;

/// REST API client module.
#[cfg(feature = "http")]
pub mod api;

// ============================================================================
// PRELUDE
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use microprediction::prelude::*;
/// ```
pub mod prelude {
    // API module exports
    #[cfg(feature = "http")]
    pub use crate::api::{
        ApiError, ApiResult, Budgets, Cdf, ErrorResponse, Leaderboard, MicroClient,
        MicroClientBuilder, Performance, ServiceConfig, Sponsors, StreamSummary, Transaction,
    };

    // Network constants
    pub use crate::network::DEFAULT_API_URL;

    // Shared types and decoding
    pub use crate::shared::{
        decode_epoch_seconds, decode_lagged, DecodeError, Horizon, LaggedPoint, LaggedSeries,
        PairField, WriteKey,
    };
}

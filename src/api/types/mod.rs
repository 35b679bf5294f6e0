//! API response types for the Microprediction REST API.
//!
//! This module contains the typed records each endpoint decodes into,
//! organized by category. The lagged series itself lives in
//! [`crate::shared::lagged`].

pub mod account;
pub mod config;
pub mod stream;

// Re-export all types for convenience
pub use account::*;
pub use config::*;
pub use stream::*;

//! Network URL constants for the Microprediction SDK.

/// Default REST API base URL for Microprediction.
pub const DEFAULT_API_URL: &str = "https://api.microprediction.org";

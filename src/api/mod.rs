//! REST API client module for Microprediction.
//!
//! This module provides a type-safe HTTP client for the Microprediction REST
//! API: stream values, lagged history, leaderboards, submissions and account
//! data.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use microprediction::api::MicroClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Read-only client with default settings
//!     let client = MicroClient::new("https://api.microprediction.org")?;
//!
//!     // Current value of a stream
//!     let value = client.get_current_value("die.json").await?;
//!     println!("die.json = {:?}", value);
//!
//!     // Lagged history, oldest first
//!     let lagged = client.get_lagged("die.json").await?;
//!     for point in &lagged {
//!         println!("{} {}", point.timestamp, point.value);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Client Configuration
//!
//! Use the builder pattern for custom configuration. Account and write
//! endpoints need a write key:
//!
//! ```rust,ignore
//! use microprediction::api::MicroClient;
//! use std::time::Duration;
//!
//! let client = MicroClient::builder("https://api.microprediction.org")
//!     .timeout(Duration::from_secs(60))
//!     .write_key("your-write-key")
//!     .build()?;
//! ```
//!
//! # Service Configuration
//!
//! Delays and the scenario count come from the service itself. Fetch them
//! once and pass the value into the calls that need it:
//!
//! ```rust,ignore
//! let config = client.get_config().await?;
//! let values = vec![0.0; config.num_predictions];
//! client.submit(&config, "die.json", &values, config.delays[0]).await?;
//! ```
//!
//! # Error Handling
//!
//! All methods return `ApiResult<T>` which is an alias for `Result<T, ApiError>`:
//!
//! ```rust,ignore
//! use microprediction::api::ApiError;
//!
//! match client.get_balance().await {
//!     Ok(balance) => println!("Balance: {}", balance),
//!     Err(ApiError::MissingWriteKey) => println!("No write key configured"),
//!     Err(e) if e.status_code().is_some() => println!("Service said no: {}", e),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```

pub mod client;
pub mod error;
pub mod types;

// Re-export main types for convenience
pub use client::{MicroClient, MicroClientBuilder};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use types::*;

//! Microprediction REST API client implementation.
//!
//! The [`MicroClient`] provides a typed interface over the Microprediction
//! REST API: live and lagged stream values, leaderboards, submissions and
//! account data.
//!
//! # Example
//!
//! ```rust,ignore
//! use microprediction::api::MicroClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MicroClient::new("https://api.microprediction.org")?;
//!
//!     let lagged = client.get_lagged("die.json").await?;
//!     println!("{} observations, latest {:?}", lagged.len(), lagged.last());
//!
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::api::types::*;
use crate::shared::lagged::{as_number, json_kind};
use crate::shared::{decode_epoch_seconds, decode_lagged, DecodeError, Horizon, LaggedSeries, PairField, WriteKey};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Builder for configuring [`MicroClient`].
#[derive(Clone)]
pub struct MicroClientBuilder {
    base_url: String,
    timeout: Duration,
    default_headers: Vec<(String, String)>,
    write_key: Option<String>,
}

impl MicroClientBuilder {
    /// Create a new builder with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_headers: Vec::new(),
            write_key: None,
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Add a default header to all requests.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Set the write key used by mutating and account endpoints.
    pub fn write_key(mut self, key: impl Into<String>) -> Self {
        self.write_key = Some(key.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> ApiResult<MicroClient> {
        let write_key = self
            .write_key
            .map(WriteKey::new)
            .transpose()
            .map_err(|e| ApiError::InvalidParameter(e.to_string()))?;

        let mut builder = Client::builder()
            .timeout(self.timeout)
            .pool_max_idle_per_host(10);

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        for (name, value) in self.default_headers {
            let header_name = reqwest::header::HeaderName::try_from(name.as_str())
                .map_err(|e| ApiError::InvalidParameter(format!("Invalid header name '{}': {}", name, e)))?;
            let header_value = reqwest::header::HeaderValue::from_str(&value)
                .map_err(|e| ApiError::InvalidParameter(format!("Invalid header value for '{}': {}", name, e)))?;
            headers.insert(header_name, header_value);
        }

        builder = builder.default_headers(headers);

        let http_client = builder.build()?;

        Ok(MicroClient {
            http_client,
            base_url: self.base_url,
            write_key,
        })
    }
}

impl std::fmt::Debug for MicroClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MicroClientBuilder")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("default_headers", &self.default_headers)
            .field("write_key", &self.write_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Microprediction REST API client.
///
/// Stateless apart from the optional write key: every method is a single
/// request/response exchange. Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct MicroClient {
    http_client: Client,
    base_url: String,
    write_key: Option<WriteKey>,
}

impl MicroClient {
    /// Create a new read-only client with the given base URL.
    ///
    /// Uses default settings (30s timeout, connection pooling).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        MicroClientBuilder::new(base_url).build()
    }

    /// Create a new client builder for custom configuration.
    pub fn builder(base_url: impl Into<String>) -> MicroClientBuilder {
        MicroClientBuilder::new(base_url)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set the write key manually.
    pub fn set_write_key(&mut self, key: impl Into<String>) -> ApiResult<()> {
        let key = WriteKey::new(key).map_err(|e| ApiError::InvalidParameter(e.to_string()))?;
        self.write_key = Some(key);
        Ok(())
    }

    /// Clear the write key.
    pub fn clear_write_key(&mut self) {
        self.write_key = None;
    }

    /// Check whether a write key is set.
    pub fn has_write_key(&self) -> bool {
        self.write_key.is_some()
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    /// Execute a request and decode the JSON body into `T`.
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &'static str,
        url: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        tracing::debug!(endpoint, method = %method, "Sending request");

        let mut request = self.http_client.request(method.clone(), url);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await?;
        let status = response.status();

        tracing::debug!(endpoint, method = %method, status = %status, "Received response");

        if !status.is_success() {
            return Err(Self::parse_error_response(response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| {
                ApiError::Deserialize(format!(
                    "Failed to deserialize {} response: {}",
                    endpoint,
                    e.without_url()
                ))
            })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        url: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        self.send(Method::GET, endpoint, url, query).await
    }

    /// Parse an error response into an ApiError.
    async fn parse_error_response(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let error_text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                let e = e.without_url();
                tracing::warn!("Failed to read error response body: {}", e);
                return Self::map_status_error(
                    status,
                    ErrorResponse::from_text(format!("HTTP {} (body unreadable: {})", status, e)),
                );
            }
        };

        let error_response = serde_json::from_str::<ErrorResponse>(&error_text)
            .unwrap_or_else(|_| ErrorResponse::from_text(error_text));

        Self::map_status_error(status, error_response)
    }

    /// Map HTTP status code to ApiError.
    fn map_status_error(status: StatusCode, mut response: ErrorResponse) -> ApiError {
        match status {
            StatusCode::BAD_REQUEST => ApiError::BadRequest(response),
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(response),
            StatusCode::FORBIDDEN => ApiError::Forbidden(response),
            StatusCode::NOT_FOUND => ApiError::NotFound(response),
            StatusCode::CONFLICT => ApiError::Conflict(response),
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited(response),
            _ if status.is_server_error() => {
                response.status_hint = Some(status.as_u16());
                ApiError::ServerError(response)
            }
            _ => ApiError::UnexpectedStatus(status.as_u16(), response),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn require_write_key(&self) -> ApiResult<&WriteKey> {
        self.write_key.as_ref().ok_or(ApiError::MissingWriteKey)
    }

    /// URL for `/{prefix}/{write_key}` account endpoints.
    fn account_url(&self, prefix: &str) -> ApiResult<String> {
        let key = self.require_write_key()?;
        Ok(self.url(&format!("/{}/{}", prefix, urlencoding::encode(key.as_str()))))
    }

    // =========================================================================
    // Validation helpers
    // =========================================================================

    /// Validate that a stream name is usable as a path segment.
    fn validate_name(name: &str) -> ApiResult<()> {
        if name.trim().is_empty() {
            return Err(ApiError::InvalidParameter("stream name cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Validate that a delay is one of the configured horizons.
    fn validate_delay(config: &ServiceConfig, delay: u64) -> ApiResult<()> {
        if !config.has_delay(delay) {
            return Err(ApiError::InvalidParameter(format!(
                "delay {} is not one of the configured delays {:?}",
                delay, config.delays
            )));
        }
        Ok(())
    }

    /// Validate a submission against the configured scenario count.
    fn validate_scenarios(config: &ServiceConfig, values: &[f64]) -> ApiResult<()> {
        if values.len() != config.num_predictions {
            return Err(ApiError::InvalidParameter(format!(
                "expected {} values, got {}",
                config.num_predictions,
                values.len()
            )));
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(ApiError::InvalidParameter(format!(
                "value at position {} is not finite",
                pos
            )));
        }
        Ok(())
    }

    fn join_values(values: &[f64]) -> String {
        values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Scalar endpoints answer `null` for unknown streams.
    fn optional_number(endpoint: &'static str, value: Value) -> ApiResult<Option<f64>> {
        if value.is_null() {
            return Ok(None);
        }
        as_number(&value).map(Some).ok_or_else(|| {
            ApiError::Deserialize(format!("Expected a number from {}, got {}", endpoint, value))
        })
    }

    fn number_list(value: &Value, field: PairField) -> Result<Vec<f64>, DecodeError> {
        let items = value.as_array().ok_or(DecodeError::NotAnArray {
            found: json_kind(value),
        })?;
        items
            .iter()
            .enumerate()
            .map(|(index, item)| as_number(item).ok_or(DecodeError::NonNumericField { index, field }))
            .collect()
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Fetch the service configuration (delays, scenario count, ...).
    pub async fn get_config(&self) -> ApiResult<ServiceConfig> {
        let url = self.url("/config.json");
        self.get("config", &url, &[]).await
    }

    // =========================================================================
    // Stream reads
    // =========================================================================

    /// Get the current value of a stream, `None` if the stream does not exist.
    pub async fn get_current_value(&self, name: &str) -> ApiResult<Option<f64>> {
        Self::validate_name(name)?;
        let url = self.url(&format!("/live/{}", urlencoding::encode(name)));
        let value: Value = self.get("live", &url, &[]).await?;
        Self::optional_number("live", value)
    }

    /// Get the leaderboard for a stream at one delay horizon.
    pub async fn get_leaderboard(
        &self,
        config: &ServiceConfig,
        name: &str,
        delay: u64,
    ) -> ApiResult<Leaderboard> {
        Self::validate_name(name)?;
        Self::validate_delay(config, delay)?;
        let url = self.url(&format!("/leaderboards/{}", urlencoding::encode(name)));
        self.get("leaderboards", &url, &[("delay", delay.to_string())]).await
    }

    /// Get the overall leaderboard across all streams.
    pub async fn get_overall(&self) -> ApiResult<Leaderboard> {
        let url = self.url("/overall/");
        self.get("overall", &url, &[]).await
    }

    /// Get stream sponsors.
    pub async fn get_sponsors(&self) -> ApiResult<Sponsors> {
        let url = self.url("/sponsors/");
        self.get("sponsors", &url, &[]).await
    }

    /// Get stream budgets.
    pub async fn get_budgets(&self) -> ApiResult<Budgets> {
        let url = self.url("/budgets/");
        self.get("budgets", &url, &[]).await
    }

    /// Get the summary document for a stream.
    pub async fn get_summary(&self, name: &str) -> ApiResult<StreamSummary> {
        Self::validate_name(name)?;
        let url = self.url(&format!("/live/summary::{}", urlencoding::encode(name)));
        self.get("summary", &url, &[]).await
    }

    /// Get lagged values, in the order the service returns them.
    pub async fn get_lagged_values(&self, name: &str) -> ApiResult<Vec<f64>> {
        Self::validate_name(name)?;
        let url = self.url(&format!("/lagged_values/{}", urlencoding::encode(name)));
        let raw: Value = self.get("lagged_values", &url, &[]).await?;
        Ok(Self::number_list(&raw, PairField::Value)?)
    }

    /// Get lagged times, in the order the service returns them.
    pub async fn get_lagged_times(&self, name: &str) -> ApiResult<Vec<DateTime<Utc>>> {
        Self::validate_name(name)?;
        let url = self.url(&format!("/lagged_times/{}", urlencoding::encode(name)));
        let raw: Value = self.get("lagged_times", &url, &[]).await?;
        let seconds = Self::number_list(&raw, PairField::Timestamp)?;
        seconds
            .into_iter()
            .enumerate()
            .map(|(index, s)| {
                decode_epoch_seconds(s).ok_or(ApiError::Decode(DecodeError::NonNumericField {
                    index,
                    field: PairField::Timestamp,
                }))
            })
            .collect()
    }

    /// Get the lagged series for a stream, oldest first.
    pub async fn get_lagged(&self, name: &str) -> ApiResult<LaggedSeries> {
        Self::validate_name(name)?;
        let url = self.url(&format!("/lagged/{}", urlencoding::encode(name)));
        let raw: Value = self.get("lagged", &url, &[]).await?;
        Ok(decode_lagged(&raw)?)
    }

    /// Get the value of a stream as it was `delay` seconds ago.
    pub async fn get_delayed_value(
        &self,
        config: &ServiceConfig,
        name: &str,
        delay: u64,
    ) -> ApiResult<Option<f64>> {
        Self::validate_name(name)?;
        Self::validate_delay(config, delay)?;
        let url = self.url(&format!("/live/delayed::{}::{}", delay, urlencoding::encode(name)));
        let value: Value = self.get("delayed", &url, &[]).await?;
        Self::optional_number("delayed", value)
    }

    /// Get the community CDF for a stream at one delay horizon.
    ///
    /// With `values`, the service evaluates the CDF at those points instead of
    /// its default grid.
    pub async fn get_cdf(
        &self,
        config: &ServiceConfig,
        name: &str,
        delay: u64,
        values: Option<&[f64]>,
    ) -> ApiResult<Cdf> {
        Self::validate_name(name)?;
        Self::validate_delay(config, delay)?;
        let url = self.url(&format!("/cdf/{}", urlencoding::encode(name)));
        let mut query = vec![("delay", delay.to_string())];
        if let Some(values) = values.filter(|v| !v.is_empty()) {
            query.push(("values", Self::join_values(values)));
        }
        self.get("cdf", &url, &query).await
    }

    // =========================================================================
    // Stream writes
    // =========================================================================

    /// Append a value to a stream, creating it if needed.
    pub async fn set(&self, name: &str, value: f64) -> ApiResult<Value> {
        Self::validate_name(name)?;
        if !value.is_finite() {
            return Err(ApiError::InvalidParameter("value must be finite".to_string()));
        }
        let key = self.require_write_key()?;
        let url = self.url(&format!("/live/{}", urlencoding::encode(name)));
        let query = [
            ("write_key", key.as_str().to_string()),
            ("value", value.to_string()),
        ];
        self.send(Method::PUT, "live", &url, &query).await
    }

    /// Delete a stream owned by this write key.
    pub async fn delete(&self, name: &str) -> ApiResult<Value> {
        Self::validate_name(name)?;
        let key = self.require_write_key()?;
        let url = self.url(&format!("/live/{}", urlencoding::encode(name)));
        self.send(Method::DELETE, "live", &url, &[("write_key", key.as_str().to_string())])
            .await
    }

    /// Keep a stream alive without writing a value.
    pub async fn touch(&self, name: &str) -> ApiResult<Value> {
        Self::validate_name(name)?;
        let key = self.require_write_key()?;
        let url = self.url(&format!("/live/{}", urlencoding::encode(name)));
        self.send(Method::PATCH, "live", &url, &[("write_key", key.as_str().to_string())])
            .await
    }

    // =========================================================================
    // Errors and warnings
    // =========================================================================

    /// Get errors logged against this write key.
    pub async fn get_errors(&self) -> ApiResult<Vec<Value>> {
        let url = self.account_url("errors")?;
        self.get("errors", &url, &[]).await
    }

    /// Clear errors logged against this write key.
    pub async fn delete_errors(&self) -> ApiResult<Value> {
        let url = self.account_url("errors")?;
        self.send(Method::DELETE, "errors", &url, &[]).await
    }

    /// Get warnings logged against this write key.
    pub async fn get_warnings(&self) -> ApiResult<Vec<Value>> {
        let url = self.account_url("warnings")?;
        self.get("warnings", &url, &[]).await
    }

    /// Clear warnings logged against this write key.
    pub async fn delete_warnings(&self) -> ApiResult<Value> {
        let url = self.account_url("warnings")?;
        self.send(Method::DELETE, "warnings", &url, &[]).await
    }

    // =========================================================================
    // Account
    // =========================================================================

    /// Get the balance of this write key.
    pub async fn get_balance(&self) -> ApiResult<f64> {
        let url = self.account_url("balance")?;
        let value: Value = self.get("balance", &url, &[]).await?;
        as_number(&value).ok_or_else(|| {
            ApiError::Deserialize(format!("Expected a number from balance, got {}", value))
        })
    }

    /// Get the horizons this write key currently has submissions for.
    pub async fn get_active(&self) -> ApiResult<Vec<Horizon>> {
        let url = self.account_url("active")?;
        self.get("active", &url, &[]).await
    }

    /// Get settled transactions for this write key.
    pub async fn get_transactions(&self) -> ApiResult<Vec<Transaction>> {
        let url = self.account_url("transactions")?;
        self.get("transactions", &url, &[]).await
    }

    /// Get cumulative performance per horizon for this write key.
    pub async fn get_performance(&self) -> ApiResult<Performance> {
        let url = self.account_url("performance")?;
        self.get("performance", &url, &[]).await
    }

    // =========================================================================
    // Submissions
    // =========================================================================

    /// Submit scenario values for one stream at one delay.
    ///
    /// `values` must hold exactly `config.num_predictions` finite numbers.
    pub async fn submit(
        &self,
        config: &ServiceConfig,
        name: &str,
        values: &[f64],
        delay: u64,
    ) -> ApiResult<Value> {
        Self::validate_name(name)?;
        Self::validate_delay(config, delay)?;
        Self::validate_scenarios(config, values)?;
        let key = self.require_write_key()?;
        let url = self.url(&format!("/submit/{}", urlencoding::encode(name)));
        let query = [
            ("write_key", key.as_str().to_string()),
            ("delay", delay.to_string()),
            ("values", Self::join_values(values)),
        ];
        self.send(Method::PUT, "submit", &url, &query).await
    }

    /// Submit the same scenario values at every configured delay.
    ///
    /// Validation happens once up front; requests then go out in delay order
    /// and the first failure is returned.
    pub async fn submit_all(
        &self,
        config: &ServiceConfig,
        name: &str,
        values: &[f64],
    ) -> ApiResult<Vec<Value>> {
        Self::validate_name(name)?;
        Self::validate_scenarios(config, values)?;
        self.require_write_key()?;
        let mut receipts = Vec::with_capacity(config.delays.len());
        for &delay in &config.delays {
            receipts.push(self.submit(config, name, values, delay).await?);
        }
        Ok(receipts)
    }

    /// Withdraw a submission for one stream at one delay.
    pub async fn cancel(&self, name: &str, delay: u64) -> ApiResult<Value> {
        Self::validate_name(name)?;
        let key = self.require_write_key()?;
        let url = self.url(&format!("/submit/{}", urlencoding::encode(name)));
        let query = [
            ("write_key", key.as_str().to_string()),
            ("delay", delay.to_string()),
        ];
        self.send(Method::DELETE, "submit", &url, &query).await
    }

    /// Withdraw submissions for a stream at every configured delay.
    pub async fn cancel_all(&self, config: &ServiceConfig, name: &str) -> ApiResult<Vec<Value>> {
        Self::validate_name(name)?;
        self.require_write_key()?;
        let mut receipts = Vec::with_capacity(config.delays.len());
        for &delay in &config.delays {
            receipts.push(self.cancel(name, delay).await?);
        }
        Ok(receipts)
    }
}

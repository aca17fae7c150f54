//! HTTP client for the Fluence VM marketplace API.
//!
//! Every request carries the bearer token, passes through the per-client
//! [`RateLimiter`], and maps non-success statuses to [`ApiError::Status`].
//! Endpoint wrappers live in the `vms`, `market`, and `ssh_keys` submodules.

mod error;
mod market;
mod rate_limit;
mod ssh_keys;
pub mod types;
mod vms;

use std::time::Duration;

use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{Level, debug, enabled};

use crate::config::FluenceConfig;

pub use error::ApiError;
pub use rate_limit::{DEFAULT_MIN_INTERVAL, RateLimiter};

/// Production API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.fluence.dev";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const USER_AGENT: &str = concat!("fvm-cli/", env!("CARGO_PKG_VERSION"));

/// Authenticated, rate-limited client for the marketplace API.
#[derive(Debug)]
pub struct FluenceClient {
    http: Client,
    base_url: String,
    api_key: String,
    limiter: RateLimiter,
}

impl FluenceClient {
    /// Creates a client for `base_url` using `api_key` for bearer auth.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] when the key or URL is blank or the HTTP
    /// client cannot be initialised.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, ApiError> {
        let key = api_key.into().trim().to_owned();
        if key.is_empty() {
            return Err(ApiError::Config(String::from("API key must not be empty")));
        }
        let url = base_url.into().trim().trim_end_matches('/').to_owned();
        if url.is_empty() {
            return Err(ApiError::Config(String::from("API URL must not be empty")));
        }
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| ApiError::Config(err.to_string()))?;
        Ok(Self {
            http,
            base_url: url,
            api_key: key,
            limiter: RateLimiter::default(),
        })
    }

    /// Creates a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] when the configured key is missing.
    pub fn from_config(config: &FluenceConfig) -> Result<Self, ApiError> {
        let key = config
            .api_key
            .as_deref()
            .ok_or_else(|| ApiError::Config(String::from("FLUENCE_API_KEY is not set")))?;
        Self::new(key, &config.api_url)
    }

    /// Replaces the minimum spacing between requests.
    #[must_use]
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.limiter = RateLimiter::new(interval);
        self
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Sends a request and returns the decoded JSON body. Empty bodies decode
    /// as an empty object.
    async fn send<B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<Value, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.limiter.acquire().await;
        let url = self.url(endpoint);

        debug!(method = %method, url = %url, "sending API request");
        if let Some(payload) = body
            && enabled!(Level::DEBUG)
        {
            let rendered = serde_json::to_string_pretty(payload).unwrap_or_default();
            debug!(body = %rendered, "request body");
        }

        let mut request = self
            .http
            .request(method.clone(), &url)
            .bearer_auth(&self.api_key);
        if let Some(payload) = body {
            request = request.json(payload);
        }

        let response = request.send().await.map_err(|err| ApiError::Transport {
            url: url.clone(),
            message: err.to_string(),
        })?;
        let status = response.status();
        let text = response.text().await.map_err(|err| ApiError::Transport {
            url: url.clone(),
            message: err.to_string(),
        })?;
        debug!(status = status.as_u16(), body = %text, "received API response");

        if !status.is_success() {
            return Err(ApiError::from_status(
                status,
                method.as_str(),
                &url,
                error_details(&text).as_deref(),
            ));
        }

        if text.trim().is_empty() {
            return Ok(Value::Object(serde_json::Map::new()));
        }
        serde_json::from_str(&text).map_err(|err| ApiError::Decode {
            url,
            message: err.to_string(),
        })
    }

    async fn request<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let value = self.send(method, endpoint, body).await?;
        serde_json::from_value(value).map_err(|err| ApiError::Decode {
            url: self.url(endpoint),
            message: err.to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request::<T, Value>(Method::GET, endpoint, None).await
    }
}

/// Extracts server supplied error details from a failed response body.
fn error_details(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) if map.contains_key("error") || map.contains_key("message") => {
            Some(Value::Object(map).to_string())
        }
        Ok(_) => None,
        Err(_) => Some(trimmed.chars().take(200).collect()),
    }
}

//! Remote JSON fetching.
//!
//! [`JsonFetch`] is the transport port for collection documents: one URL
//! in, exactly one resolution out. [`HttpJsonFetch`] implements it over a
//! reqwest client; orchestration tests substitute the stub in
//! [`test_support`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use url::Url;

#[doc(hidden)]
pub mod test_support;

/// Default user agent for collection fetches.
pub const DEFAULT_USER_AGENT: &str = "waymark/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Error resolving a remote JSON document.
///
/// Variants carry message strings rather than error sources so load
/// reports stay cloneable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FetchError {
    /// The URL could not be parsed.
    #[error("invalid collection URL {url}: {message}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Parser failure description.
        message: String,
    },
    /// The server answered with a non-success status.
    #[error("HTTP status {status} fetching {url}")]
    Http {
        /// Requested URL.
        url: String,
        /// Response status code.
        status: u16,
    },
    /// The request failed before a response arrived.
    #[error("network error fetching {url}: {message}")]
    Network {
        /// Requested URL.
        url: String,
        /// Transport failure description.
        message: String,
    },
    /// The response body is not valid JSON.
    #[error("response from {url} is not valid JSON: {message}")]
    Decode {
        /// Requested URL.
        url: String,
        /// Decoder failure description.
        message: String,
    },
}

/// Error building the HTTP fetcher.
#[derive(Debug, Error)]
#[error("failed to build HTTP client")]
pub struct FetchBuildError(#[from] reqwest::Error);

/// Transport port for remote collection documents.
#[async_trait(?Send)]
pub trait JsonFetch {
    /// Fetch and decode one JSON document.
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError>;
}

/// Configuration for [`HttpJsonFetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpJsonFetchConfig {
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpJsonFetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpJsonFetchConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// HTTP implementation of [`JsonFetch`] over a shared reqwest client.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use waymark_ingest::{HttpJsonFetch, HttpJsonFetchConfig, JsonFetch};
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let config = HttpJsonFetchConfig::new()
///     .with_timeout(Duration::from_secs(10))
///     .with_user_agent("my-map-app/2.1");
/// let fetch = HttpJsonFetch::with_config(config)?;
/// let document = fetch.fetch_json("https://example.org/city.waymark.json").await?;
/// println!("{document}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpJsonFetch {
    client: Client,
}

impl HttpJsonFetch {
    /// Build a fetcher with default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FetchBuildError`] if the HTTP client fails to build.
    pub fn new() -> Result<Self, FetchBuildError> {
        Self::with_config(HttpJsonFetchConfig::default())
    }

    /// Build a fetcher with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FetchBuildError`] if the HTTP client fails to build.
    pub fn with_config(config: HttpJsonFetchConfig) -> Result<Self, FetchBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait(?Send)]
impl JsonFetch for HttpJsonFetch {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        let target = Url::parse(url).map_err(|error| FetchError::InvalidUrl {
            url: url.to_owned(),
            message: error.to_string(),
        })?;
        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(|error| convert_reqwest_error(url, &error))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }
        response.json().await.map_err(|error| FetchError::Decode {
            url: url.to_owned(),
            message: error.to_string(),
        })
    }
}

fn convert_reqwest_error(url: &str, error: &reqwest::Error) -> FetchError {
    error.status().map_or_else(
        || FetchError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        },
        |status| FetchError::Http {
            url: url.to_owned(),
            status: status.as_u16(),
        },
    )
}

//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeouts
//! - One retry of connection-level failures after a fixed delay
//! - Classifying status codes into accepted pages and failed attempts

use crate::config::HttpConfig;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// A page body that may be parsed
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code, either 200 or 404
    pub status_code: u16,
    pub body: String,
}

impl FetchedPage {
    /// Dead links among valid article paths are expected; their pages are still recorded
    pub fn is_not_found(&self) -> bool {
        self.status_code == StatusCode::NOT_FOUND.as_u16()
    }
}

/// Why a fetch attempt failed
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection refused, DNS failure or timeout, on the first try and on the retry
    #[error("Connection to {url} failed after {attempts} attempts: {source}")]
    Connection {
        url: String,
        attempts: u32,
        source: reqwest::Error,
    },

    /// Any status other than 200 or 404
    #[error("Unexpected HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("Failed to read body of {url}: {source}")]
    Body { url: String, source: reqwest::Error },
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use wiki_math_crawler::config::HttpConfig;
/// use wiki_math_crawler::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Whether an error happened before any response arrived
fn is_connection_failure(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout()
}

/// Performs GET requests with the crawl's retry policy
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 200 | Accept |
/// | HTTP 404 | Accept (dead link, parsed as usual) |
/// | Any other status | Fail, no retry |
/// | Connection error / timeout | Retry once after `retry_delay`, then fail |
/// | Other request or body error | Fail, no retry |
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    retry_delay: Duration,
}

impl Fetcher {
    pub fn new(client: Client, retry_delay: Duration) -> Self {
        Self {
            client,
            retry_delay,
        }
    }

    /// Builds the client from configuration
    pub fn from_config(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            build_http_client(config)?,
            Duration::from_millis(config.retry_delay_ms),
        ))
    }

    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) if is_connection_failure(&e) => {
                tracing::warn!(
                    "Connection to {} failed ({}), retrying in {:?}",
                    url,
                    e,
                    self.retry_delay
                );
                tokio::time::sleep(self.retry_delay).await;

                match self.client.get(url).send().await {
                    Ok(response) => response,
                    Err(source) if is_connection_failure(&source) => {
                        return Err(FetchError::Connection {
                            url: url.to_string(),
                            attempts: 2,
                            source,
                        })
                    }
                    Err(source) => {
                        return Err(FetchError::Request {
                            url: url.to_string(),
                            source,
                        })
                    }
                }
            }
            Err(source) => {
                return Err(FetchError::Request {
                    url: url.to_string(),
                    source,
                })
            }
        };

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::NOT_FOUND {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;

        Ok(FetchedPage {
            status_code: status.as_u16(),
            body,
        })
    }
}

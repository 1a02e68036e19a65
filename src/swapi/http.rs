//! HTTP utilities for SWAPI REST calls

use super::error::FetchError;
use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use std::future::Future;

/// Maximum length of response body to log
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// Generic HTTP GET capability the resource stores are built on
pub trait Transport: Send + Sync + 'static {
    /// GET `url` and parse the body as JSON
    fn get_json(&self, url: &str) -> impl Future<Output = Result<Value, FetchError>> + Send;
}

/// HTTP client wrapper for SWAPI calls
#[derive(Clone)]
pub struct SwapiHttpClient {
    client: Client,
}

impl SwapiHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("holonet/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Make a GET request and parse the JSON body
    pub async fn get(&self, url: &str) -> Result<Value, FetchError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::network)?;

        let status = response.status();
        let body = response.text().await.map_err(FetchError::network)?;

        if !status.is_success() {
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(FetchError::from_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Unparseable body from {}: {}", url, sanitize_for_log(&body));
            FetchError::decode(e)
        })
    }
}

impl Transport for SwapiHttpClient {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        self.get(url).await
    }
}

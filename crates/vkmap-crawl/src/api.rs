//! Remote API transport.
//!
//! The crawler only needs `call(method, params) -> payload`. `HttpTransport`
//! provides it over reqwest: an HTTP GET against `{base_url}{method}` carrying
//! the access token and API version, bounded by a per-request timeout.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::config::VkSettings;
use crate::dto::decode_envelope;
use crate::error::{CrawlError, FetchError, Result};

/// Query parameters of a single call, excluding credentials.
pub type Params = Vec<(&'static str, String)>;

/// A source of API payloads.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Invoke `method` and return the unwrapped `response` payload.
    async fn call(
        &self,
        method: &str,
        params: &Params,
    ) -> std::result::Result<serde_json::Value, FetchError>;
}

/// reqwest-backed transport for the VK API.
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    access_token: String,
    api_version: String,
}

impl HttpTransport {
    /// Build a transport from settings.
    pub fn new(settings: &VkSettings) -> Result<Self> {
        let mut base_url = Url::parse(&settings.base_url)
            .map_err(|e| CrawlError::Config(format!("invalid vk.base_url: {e}")))?;
        // `join` replaces the last segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        if settings.access_token.is_empty() {
            tracing::warn!("No access token configured; the API will reject most calls");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| CrawlError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            access_token: settings.access_token.clone(),
            api_version: settings.api_version.clone(),
        })
    }

    fn method_url(&self, method: &str) -> std::result::Result<Url, FetchError> {
        self.base_url
            .join(method)
            .map_err(|e| FetchError::Network(format!("invalid method {method}: {e}")))
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn call(
        &self,
        method: &str,
        params: &Params,
    ) -> std::result::Result<serde_json::Value, FetchError> {
        let url = self.method_url(method)?;
        tracing::debug!(method, "API call");

        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[
                ("access_token", self.access_token.as_str()),
                ("v", self.api_version.as_str()),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(FetchError::Network(format!(
                "{method} returned status {}",
                status.as_u16()
            )));
        }

        decode_envelope(&body)
    }
}

fn map_transport_error(error: reqwest::Error) -> FetchError {
    // Strip the URL: it carries the access token.
    let error = error.without_url();
    if error.is_timeout() {
        FetchError::Timeout(error.to_string())
    } else {
        FetchError::Network(error.to_string())
    }
}

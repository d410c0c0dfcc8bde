//! HTTP transport backed by reqwest

use crate::{
    constants::{BLOCKFOLIO_API_URL, MAGIC_HEADER, REQUEST_TIMEOUT_SECS, USER_AGENT},
    error::TransportError,
    transport::{Credentials, Request, Transport},
};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;

/// Transport talking to the Blockfolio REST API
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    /// Creates a transport for the default API URL
    pub fn new() -> Result<Self, TransportError> {
        Self::with_base_url(BLOCKFOLIO_API_URL)
    }

    /// Creates a transport for a custom API URL
    pub fn with_base_url(base_url: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(TransportError::Network)?;

        let base_url = Url::parse(base_url).map_err(|e| {
            TransportError::InvalidRequest(format!("invalid base URL {}: {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::InvalidRequest(format!(
                "{} cannot be a base URL",
                base_url
            )));
        }

        Ok(Self { client, base_url })
    }

    /// Appends each path segment percent-encoded, so ids and pairs never leave their slot
    fn build_url(
        &self,
        request: &Request,
        credentials: &Credentials,
    ) -> Result<Url, TransportError> {
        let segments = request.path_segments(credentials);
        if let Some(segment) = segments.iter().find(|s| matches!(s.as_str(), "." | "..")) {
            return Err(TransportError::InvalidRequest(format!(
                "`{}` is not a valid path segment for {}",
                segment, request.endpoint
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidRequest("base URL has no path".to_string()))?
            .pop_if_empty()
            .extend(&segments);
        Ok(url)
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new().expect("Failed to create HTTP transport")
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &Request,
        credentials: &Credentials,
    ) -> Result<Value, TransportError> {
        let url = self.build_url(request, credentials)?;
        tracing::trace!(method = %request.method, endpoint = request.endpoint, "Sending request");

        let response = self
            .client
            .request(request.method.clone(), url)
            .header(MAGIC_HEADER.0, MAGIC_HEADER.1)
            .query(&request.query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Network(e)
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(TransportError::RateLimitExceeded);
        }

        let response_text = response.text().await.map_err(TransportError::Network)?;

        if !status.is_success() {
            return Err(TransportError::Http {
                status: status.as_u16(),
                body: response_text,
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            TransportError::InvalidResponse(format!(
                "Failed to parse Blockfolio response: {}. Response: {}",
                e, response_text
            ))
        })
    }

    fn transport_name(&self) -> &'static str {
        "http"
    }
}

//! Transport abstraction for reaching the Blockfolio service

use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

/// Credentials supplied by the session on every call
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub client_token: Option<String>,
}

/// A single call to the service
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub endpoint: &'static str,
    /// Whether the client token belongs in the path
    pub scoped: bool,
    /// Path segments after the endpoint (and token)
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
}

impl Request {
    /// Unscoped GET request
    pub fn get(endpoint: &'static str) -> Self {
        Self {
            method: Method::GET,
            endpoint,
            scoped: false,
            segments: Vec::new(),
            query: Vec::new(),
        }
    }

    /// GET request carrying the client token
    pub fn scoped(endpoint: &'static str) -> Self {
        Self {
            scoped: true,
            ..Self::get(endpoint)
        }
    }

    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Unescaped path segments: endpoint, client token when scoped, then segments
    pub fn path_segments(&self, credentials: &Credentials) -> Vec<String> {
        let mut parts = vec![self.endpoint.to_string()];
        if self.scoped {
            parts.push(credentials.client_token.clone().unwrap_or_default());
        }
        parts.extend(self.segments.iter().cloned());
        parts
    }

    /// Unescaped path relative to the API root; transports must encode each segment
    pub fn path(&self, credentials: &Credentials) -> String {
        self.path_segments(credentials).join("/")
    }
}

/// Collaborator performing HTTP calls
///
/// Implementations own retry and timeout policy; the client never retries.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a request and returns the parsed response body
    async fn send(
        &self,
        request: &Request,
        credentials: &Credentials,
    ) -> Result<Value, TransportError>;

    /// Returns the name of this transport
    fn transport_name(&self) -> &'static str;
}

//! Validate-then-dispatch pipeline shared by every operation

use crate::{
    error::{BlockfolioError, Result, TransportError},
    metrics::{DispatchMetrics, MetricsCollector},
    session::SessionStore,
    transport::{Request, Transport},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Fails with `MissingArgument` when `value` is empty or blank
pub fn require<'a>(value: &'a str, message: &str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        Err(BlockfolioError::missing_argument(message))
    } else {
        Ok(value)
    }
}

/// Message of a `{"success": false}` body, `default` when it carries none
pub(crate) fn rejection(body: &Value, default: &str) -> Option<String> {
    if body.get("success").and_then(Value::as_bool) != Some(false) {
        return None;
    }

    let message = ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .unwrap_or(default);
    Some(message.to_string())
}

/// Forwards requests to the transport with session credentials
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    metrics: MetricsCollector,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let metrics = MetricsCollector::new(transport.transport_name());
        Self {
            transport,
            session: Arc::new(SessionStore::new()),
            metrics,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub async fn metrics(&self) -> DispatchMetrics {
        self.metrics.get_metrics().await
    }

    /// Init guard of portfolio-scoped operations
    pub async fn ensure_initialized(&self) -> Result<()> {
        self.session.ensure_initialized().await
    }

    /// Sends a request, leaving the body uninterpreted
    pub async fn transmit(&self, request: &Request) -> Result<Value, TransportError> {
        let credentials = self.session.credentials().await;
        let start = Instant::now();

        let result = self.transport.send(request, &credentials).await;
        let latency_ms = start.elapsed().as_millis() as u64;
        self.metrics
            .record_request(start.elapsed(), result.is_ok())
            .await;

        match &result {
            Ok(_) => tracing::debug!(
                endpoint = request.endpoint,
                transport = self.transport.transport_name(),
                latency_ms,
                "Request completed"
            ),
            Err(e) => tracing::warn!(
                endpoint = request.endpoint,
                latency_ms,
                error = %e,
                "Request failed"
            ),
        }

        result
    }

    /// Sends a request; a body flagged `success: false` becomes `Remote`
    pub async fn send(&self, request: &Request) -> Result<Value> {
        let body = self.transmit(request).await?;
        match rejection(&body, "Request rejected by Blockfolio") {
            Some(message) => Err(BlockfolioError::Remote(message)),
            None => Ok(body),
        }
    }

    /// Sends a request and decodes `body[field]`
    pub async fn fetch<T: DeserializeOwned>(&self, request: &Request, field: &str) -> Result<T> {
        let body = self.send(request).await?;
        extract(body, field)
    }

    /// Sends a mutation and returns the service status, `"success"` for `{"success": true}`
    pub async fn status(&self, request: &Request) -> Result<String> {
        let body = self.send(request).await?;
        match body {
            Value::String(status) => Ok(status),
            _ => Ok("success".to_string()),
        }
    }
}

fn extract<T: DeserializeOwned>(mut body: Value, field: &str) -> Result<T> {
    let value = body.get_mut(field).map(Value::take).ok_or_else(|| {
        BlockfolioError::remote(format!(
            "Unexpected response from Blockfolio: missing `{}`",
            field
        ))
    })?;

    serde_json::from_value(value).map_err(|e| {
        BlockfolioError::remote(format!(
            "Unexpected response from Blockfolio: `{}` {}",
            field, e
        ))
    })
}

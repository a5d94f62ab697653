//! The single outbound path to the remote API.
//!
//! # Design
//! `Gateway` owns the fixed configuration (base URL, timeout) and a
//! `Transport`. Every call runs the request stage, one transport attempt,
//! then the response stage; there are no retries, so one failed attempt
//! surfaces immediately as a `GatewayError`. The gateway is cheap to clone
//! and shared by the resource clients.

use std::sync::Arc;

use serde_json::Value;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::interceptor;
use crate::transport::{Transport, UreqTransport};

#[derive(Clone)]
pub struct Gateway {
    config: Arc<GatewayConfig>,
    transport: Arc<dyn Transport>,
}

impl Gateway {
    /// Gateway over the production `ureq` transport.
    pub fn new(config: GatewayConfig) -> Self {
        let transport = Arc::new(UreqTransport::new(config.timeout));
        Self::with_transport(config, transport)
    }

    pub fn with_transport(config: GatewayConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Execute one request through both interceptor stages.
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, GatewayError> {
        let method = request.method;
        let path = request.path.clone();
        let prepared = interceptor::prepare(&self.config, request)?;

        match self.transport.execute(prepared).await {
            Ok(response) => interceptor::normalize(method, &path, response),
            Err(err) => Err(interceptor::transport_failure(method, &path, err)),
        }
    }

    /// Send an optional JSON body and return the response body as JSON.
    ///
    /// An empty body decodes to `Value::Null`. Any other body that is not
    /// JSON fails with `GatewayError::Decode`.
    pub async fn request(&self, method: HttpMethod, path: &str, body: Option<&Value>) -> Result<Value, GatewayError> {
        let mut request = HttpRequest::new(method, path);
        if let Some(body) = body {
            let encoded = serde_json::to_string(body).map_err(|e| GatewayError::Request(e.to_string()))?;
            request = request.with_json_body(encoded);
        }

        let response = self.send(request).await?;
        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&response.body).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway").field("config", &self.config).finish_non_exhaustive()
    }
}

//! The two interceptor stages wrapped around every gateway call.
//!
//! The request stage validates and resolves an outbound request and logs
//! it. The response stage logs what came back and folds every failure into
//! one of the three `GatewayError` kinds. Both stages are pure apart from
//! their log lines, so the gateway stays a thin composition of
//! `prepare -> Transport::execute -> normalize`.

use serde_json::Value;
use tracing::{error, info, warn};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

const UNKNOWN_ERROR: &str = "Unknown error";

/// Outbound stage: reject requests that cannot be issued, add the JSON
/// content type, and resolve `path` against the configured base URL.
pub fn prepare(config: &GatewayConfig, mut request: HttpRequest) -> Result<HttpRequest, GatewayError> {
    if !request.path.starts_with('/') {
        let err = GatewayError::Request(format!("path must start with '/', got {:?}", request.path));
        error!(method = %request.method, error = %err, "Request error");
        return Err(err);
    }
    if request.header("content-type").is_none() {
        request
            .headers
            .push(("content-type".to_string(), "application/json".to_string()));
    }

    info!(method = %request.method, path = %request.path, "Making {} request to: {}", request.method, request.path);
    request.path = format!("{}{}", config.base_url, request.path);
    Ok(request)
}

/// Inbound stage for a received response: pass 2xx through, turn anything
/// else into `GatewayError::Http`.
pub fn normalize(method: HttpMethod, path: &str, response: HttpResponse) -> Result<HttpResponse, GatewayError> {
    if response.is_success() {
        info!(%method, path, status = response.status, "Response received from: {path}");
        return Ok(response);
    }

    let err = GatewayError::Http {
        status: response.status,
        status_text: response.status_text.clone(),
        message: error_message(&response.body),
    };
    warn!(%method, path, status = response.status, error = %err, "Response error");
    Err(err)
}

/// Inbound stage for a call that produced no response.
pub fn transport_failure(method: HttpMethod, path: &str, err: TransportError) -> GatewayError {
    error!(%method, path, error = %err, "Response error");
    err.into()
}

/// The `message` field of a JSON error body, if there is one.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
}

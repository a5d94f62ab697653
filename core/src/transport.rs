//! Network execution behind the gateway.
//!
//! # Design
//! `Transport` is the only seam that performs I/O. It receives a request
//! whose path has already been resolved to an absolute URL and returns the
//! raw response whatever its status; status interpretation belongs to the
//! gateway's response stage. Once a status line has arrived the exchange
//! counts as answered: a body that is not UTF-8 is decoded lossily, and one
//! that cannot be read at all is passed on as empty. `UreqTransport` runs the blocking `ureq` call
//! on tokio's blocking pool so store actions stay async.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;
use ureq::http::Response;
use ureq::typestate::WithBody;
use ureq::{Agent, Body, RequestBuilder};

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Production transport backed by a shared `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    /// Build an agent that returns 4xx/5xx responses as data and gives up
    /// on any call exceeding `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || execute_blocking(&agent, request))
            .await
            .map_err(|e| TransportError::Network(format!("transport task failed: {e}")))?
    }
}

fn execute_blocking(agent: &Agent, request: HttpRequest) -> Result<HttpResponse, TransportError> {
    let HttpRequest {
        method,
        path,
        headers,
        body,
    } = request;

    let result = match method {
        HttpMethod::Get => with_headers(agent.get(&path), &headers).call(),
        HttpMethod::Delete => with_headers(agent.delete(&path), &headers).call(),
        HttpMethod::Post => send(with_headers(agent.post(&path), &headers), body),
        HttpMethod::Put => send(with_headers(agent.put(&path), &headers), body),
        HttpMethod::Patch => send(with_headers(agent.patch(&path), &headers), body),
    };
    let mut response = result.map_err(classify)?;

    let status = response.status();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let body = match response.body_mut().read_to_vec() {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(err) => {
            warn!(status = status.as_u16(), error = %err, "response body unreadable");
            String::new()
        }
    };

    Ok(HttpResponse {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        headers,
        body,
    })
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (key, value) in headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    builder
}

fn send(builder: RequestBuilder<WithBody>, body: Option<String>) -> Result<Response<Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

/// Split `ureq` failures into "could not issue" and "no response".
fn classify(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::BadUri(msg) => TransportError::Request(msg),
        ureq::Error::Http(e) => TransportError::Request(e.to_string()),
        other => TransportError::Network(other.to_string()),
    }
}

//! Error types for the gateway, the resource clients and configuration.
//!
//! # Design
//! `GatewayError` is discriminated by the stage that failed: the request
//! could not be built (`Request`), nothing came back (`Network`), a
//! response arrived with a non-2xx status (`Http`), or a 2xx body was not
//! JSON when `Gateway::request` had to decode it (`Decode`). Resource
//! clients wrap it in `ApiError`, whose message names the resource and
//! verb while keeping the gateway message as its tail. Stores only ever
//! keep the rendered message.

use std::fmt;

use thiserror::Error;

use crate::ids::IdsExhausted;

/// Failures raised by a `Transport` before any response was produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The call was issued but nothing came back: connect failure,
    /// timeout, or an I/O error mid-exchange.
    #[error("no response: {0}")]
    Network(String),

    /// The call could not be issued at all.
    #[error("invalid request: {0}")]
    Request(String),
}

/// Normalized failure of a single gateway call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// No response was received. `detail` keeps the transport's reason for
    /// diagnostics; it is not part of the user-facing message.
    #[error("Network Error: No response received from server")]
    Network { detail: String },

    /// A response was received with a non-2xx status.
    #[error("API Error: {status} {status_text} - {message}")]
    Http {
        status: u16,
        status_text: String,
        message: String,
    },

    /// The request could not be constructed.
    #[error("Request Error: {0}")]
    Request(String),

    /// A successful response whose body is not JSON.
    #[error("Decode Error: {0}")]
    Decode(String),
}

impl From<TransportError> for GatewayError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Network(detail) => GatewayError::Network { detail },
            TransportError::Request(msg) => GatewayError::Request(msg),
        }
    }
}

/// The resource-and-verb pair a client call was performing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchTodos,
    CreateTodo,
    UpdateTodo,
    DeleteTodo,
    FetchUsers,
    FetchUser,
    CreateUser,
    UpdateUser,
    DeleteUser,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Operation::FetchTodos => "fetch todos",
            Operation::CreateTodo => "create todo",
            Operation::UpdateTodo => "update todo",
            Operation::DeleteTodo => "delete todo",
            Operation::FetchUsers => "fetch users",
            Operation::FetchUser => "fetch user",
            Operation::CreateUser => "create user",
            Operation::UpdateUser => "update user",
            Operation::DeleteUser => "delete user",
        };
        f.write_str(text)
    }
}

/// Why a resource client call failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiCause {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// A 2xx response whose body did not match the expected shape.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The server accepted a creation but no client-side id was left for it.
    #[error(transparent)]
    Ids(#[from] IdsExhausted),
}

/// Error returned by `TodoClient` and `UserClient` verbs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to {operation}: {cause}")]
pub struct ApiError {
    pub operation: Operation,
    #[source]
    pub cause: ApiCause,
}

impl ApiError {
    pub fn new(operation: Operation, cause: impl Into<ApiCause>) -> Self {
        Self {
            operation,
            cause: cause.into(),
        }
    }

    pub fn decode(operation: Operation, err: &serde_json::Error) -> Self {
        Self::new(operation, ApiCause::Decode(err.to_string()))
    }

    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match &self.cause {
            ApiCause::Gateway(GatewayError::Http { status, .. }) => Some(*status),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self.cause, ApiCause::Gateway(GatewayError::Network { .. }))
    }
}

/// Invalid values found while loading `GatewayConfig` from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must be an http(s) URL, got {value:?}")]
    InvalidUrl { var: &'static str, value: String },
}

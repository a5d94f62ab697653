//! Verb-oriented resource clients.
//!
//! # Design
//! Each client splits a verb into a pure `build_*` step producing an
//! `HttpRequest` and a pure `parse_*` step consuming the `HttpResponse`,
//! with the `Gateway` executing the round-trip in between. The async verbs
//! compose the three and rewrap any failure as an `ApiError` naming the
//! resource and verb. Stores depend on the `TodoApi` / `UserApi` traits
//! rather than the concrete clients so they can be driven by fakes.

mod todo;
mod user;

pub use todo::TodoClient;
pub use user::UserClient;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ApiError, GatewayError, Operation};
use crate::http::HttpResponse;
use crate::types::{NewTodo, Todo, User, UserData};

#[async_trait]
pub trait TodoApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Todo>, ApiError>;
    /// Create a todo. The returned id is assigned client-side.
    async fn create(&self, input: NewTodo) -> Result<Todo, ApiError>;
    /// Replace the todo at `id` with `todo`.
    async fn update(&self, id: u64, todo: Todo) -> Result<Todo, ApiError>;
    async fn remove(&self, id: u64) -> Result<(), ApiError>;
}

#[async_trait]
pub trait UserApi: Send + Sync {
    async fn list(&self) -> Result<Vec<User>, ApiError>;
    async fn get(&self, id: u64) -> Result<User, ApiError>;
    /// Create a user. The returned id is assigned client-side.
    async fn create(&self, data: UserData) -> Result<User, ApiError>;
    async fn update(&self, id: u64, data: UserData) -> Result<User, ApiError>;
    async fn remove(&self, id: u64) -> Result<(), ApiError>;
}

fn encode<T: Serialize>(operation: Operation, value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::new(operation, GatewayError::Request(e.to_string())))
}

fn decode<T: DeserializeOwned>(operation: Operation, response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::decode(operation, &e))
}

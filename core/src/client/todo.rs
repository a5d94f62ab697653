use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{decode, encode, TodoApi};
use crate::error::{ApiError, Operation};
use crate::gateway::Gateway;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::ids::IdGenerator;
use crate::types::{NewTodo, Todo};

/// Client for the `todos` resource.
#[derive(Debug, Clone)]
pub struct TodoClient {
    gateway: Gateway,
    ids: Arc<IdGenerator>,
}

impl TodoClient {
    pub fn new(gateway: Gateway) -> Self {
        Self::with_ids(gateway, Arc::new(IdGenerator::new()))
    }

    pub fn with_ids(gateway: Gateway, ids: Arc<IdGenerator>) -> Self {
        Self { gateway, ids }
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        let limit = self.gateway.config().todo_limit;
        HttpRequest::new(HttpMethod::Get, format!("/todos?_limit={limit}"))
    }

    pub fn build_create_todo(&self, input: &NewTodo) -> Result<HttpRequest, ApiError> {
        let body = encode(Operation::CreateTodo, input)?;
        Ok(HttpRequest::new(HttpMethod::Post, "/todos").with_json_body(body))
    }

    pub fn build_update_todo(&self, id: u64, todo: &Todo) -> Result<HttpRequest, ApiError> {
        let body = encode(Operation::UpdateTodo, todo)?;
        Ok(HttpRequest::new(HttpMethod::Put, format!("/todos/{id}")).with_json_body(body))
    }

    pub fn build_delete_todo(&self, id: u64) -> HttpRequest {
        HttpRequest::new(HttpMethod::Delete, format!("/todos/{id}"))
    }

    pub fn parse_list_todos(&self, response: &HttpResponse) -> Result<Vec<Todo>, ApiError> {
        decode(Operation::FetchTodos, response)
    }

    /// Decode the server's echo of a creation, placeholder id included.
    pub fn parse_create_todo(&self, response: &HttpResponse) -> Result<Todo, ApiError> {
        decode(Operation::CreateTodo, response)
    }

    pub fn parse_update_todo(&self, response: &HttpResponse) -> Result<Todo, ApiError> {
        decode(Operation::UpdateTodo, response)
    }

    async fn execute(&self, operation: Operation, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.gateway
            .send(request)
            .await
            .map_err(|e| ApiError::new(operation, e))
    }
}

#[async_trait]
impl TodoApi for TodoClient {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Todo>, ApiError> {
        let response = self.execute(Operation::FetchTodos, self.build_list_todos()).await?;
        let todos = self.parse_list_todos(&response)?;
        self.ids.observe_all(todos.iter().map(|t| t.id));
        debug!(count = todos.len(), "fetched todos");
        Ok(todos)
    }

    #[instrument(skip(self))]
    async fn create(&self, input: NewTodo) -> Result<Todo, ApiError> {
        let request = self.build_create_todo(&input)?;
        let response = self.execute(Operation::CreateTodo, request).await?;
        let mut todo = self.parse_create_todo(&response)?;
        let placeholder = todo.id;
        todo.id = self.ids.next_id().map_err(|e| ApiError::new(Operation::CreateTodo, e))?;
        debug!(placeholder, id = todo.id, "assigned client-side id");
        Ok(todo)
    }

    #[instrument(skip(self))]
    async fn update(&self, id: u64, todo: Todo) -> Result<Todo, ApiError> {
        let request = self.build_update_todo(id, &todo)?;
        let response = self.execute(Operation::UpdateTodo, request).await?;
        self.parse_update_todo(&response)
    }

    #[instrument(skip(self))]
    async fn remove(&self, id: u64) -> Result<(), ApiError> {
        self.execute(Operation::DeleteTodo, self.build_delete_todo(id)).await?;
        Ok(())
    }
}

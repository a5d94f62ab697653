use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{decode, encode, UserApi};
use crate::error::{ApiError, Operation};
use crate::gateway::Gateway;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::ids::IdGenerator;
use crate::types::{User, UserData};

/// Client for the `users` resource.
#[derive(Debug, Clone)]
pub struct UserClient {
    gateway: Gateway,
    ids: Arc<IdGenerator>,
}

impl UserClient {
    pub fn new(gateway: Gateway) -> Self {
        Self::with_ids(gateway, Arc::new(IdGenerator::new()))
    }

    pub fn with_ids(gateway: Gateway, ids: Arc<IdGenerator>) -> Self {
        Self { gateway, ids }
    }

    pub fn build_list_users(&self) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, "/users")
    }

    pub fn build_get_user(&self, id: u64) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, format!("/users/{id}"))
    }

    pub fn build_create_user(&self, data: &UserData) -> Result<HttpRequest, ApiError> {
        let body = encode(Operation::CreateUser, data)?;
        Ok(HttpRequest::new(HttpMethod::Post, "/users").with_json_body(body))
    }

    pub fn build_update_user(&self, id: u64, data: &UserData) -> Result<HttpRequest, ApiError> {
        let body = encode(Operation::UpdateUser, data)?;
        Ok(HttpRequest::new(HttpMethod::Put, format!("/users/{id}")).with_json_body(body))
    }

    pub fn build_delete_user(&self, id: u64) -> HttpRequest {
        HttpRequest::new(HttpMethod::Delete, format!("/users/{id}"))
    }

    pub fn parse_list_users(&self, response: &HttpResponse) -> Result<Vec<User>, ApiError> {
        decode(Operation::FetchUsers, response)
    }

    pub fn parse_get_user(&self, response: &HttpResponse) -> Result<User, ApiError> {
        decode(Operation::FetchUser, response)
    }

    pub fn parse_create_user(&self, response: &HttpResponse) -> Result<User, ApiError> {
        decode(Operation::CreateUser, response)
    }

    pub fn parse_update_user(&self, response: &HttpResponse) -> Result<User, ApiError> {
        decode(Operation::UpdateUser, response)
    }

    async fn execute(&self, operation: Operation, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.gateway
            .send(request)
            .await
            .map_err(|e| ApiError::new(operation, e))
    }
}

#[async_trait]
impl UserApi for UserClient {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<User>, ApiError> {
        let response = self.execute(Operation::FetchUsers, self.build_list_users()).await?;
        let users = self.parse_list_users(&response)?;
        self.ids.observe_all(users.iter().map(|u| u.id));
        debug!(count = users.len(), "fetched users");
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: u64) -> Result<User, ApiError> {
        let response = self.execute(Operation::FetchUser, self.build_get_user(id)).await?;
        let user = self.parse_get_user(&response)?;
        self.ids.observe(user.id);
        Ok(user)
    }

    #[instrument(skip(self, data), fields(name = %data.name))]
    async fn create(&self, data: UserData) -> Result<User, ApiError> {
        let request = self.build_create_user(&data)?;
        let response = self.execute(Operation::CreateUser, request).await?;
        let mut user = self.parse_create_user(&response)?;
        let placeholder = user.id;
        user.id = self.ids.next_id().map_err(|e| ApiError::new(Operation::CreateUser, e))?;
        debug!(placeholder, id = user.id, "assigned client-side id");
        Ok(user)
    }

    #[instrument(skip(self, data), fields(name = %data.name))]
    async fn update(&self, id: u64, data: UserData) -> Result<User, ApiError> {
        let request = self.build_update_user(id, &data)?;
        let response = self.execute(Operation::UpdateUser, request).await?;
        self.parse_update_user(&response)
    }

    #[instrument(skip(self))]
    async fn remove(&self, id: u64) -> Result<(), ApiError> {
        self.execute(Operation::DeleteUser, self.build_delete_user(id)).await?;
        Ok(())
    }
}

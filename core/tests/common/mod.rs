//! Scripted fakes for driving the stores without a server.
//!
//! Each fake pops one queued reply per call and records the call, so tests
//! can assert both the resulting state and which requests were made.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use dashboard_core::{ApiError, GatewayError, NewTodo, Operation, Todo, TodoApi, User, UserApi, UserData};

pub enum Reply<T> {
    Ok(T),
    Err(ApiError),
    /// Resolve with `T` after sleeping, to keep a call in flight.
    Slow(Duration, T),
}

pub struct Script<T> {
    replies: Mutex<VecDeque<Reply<T>>>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
        }
    }
}

impl<T> Script<T> {
    pub fn push(&self, reply: Reply<T>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    async fn next(&self, what: &str) -> Result<T, ApiError> {
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected call: {what}"));
        match reply {
            Reply::Ok(value) => Ok(value),
            Reply::Err(err) => Err(err),
            Reply::Slow(delay, value) => {
                tokio::time::sleep(delay).await;
                Ok(value)
            }
        }
    }
}

pub fn http_error(operation: Operation, status: u16, status_text: &str) -> ApiError {
    ApiError::new(
        operation,
        GatewayError::Http {
            status,
            status_text: status_text.to_string(),
            message: "Unknown error".to_string(),
        },
    )
}

pub fn network_error(operation: Operation) -> ApiError {
    ApiError::new(
        operation,
        GatewayError::Network {
            detail: "connection refused".to_string(),
        },
    )
}

pub fn todo(id: u64, title: &str, completed: bool) -> Todo {
    Todo {
        id,
        title: title.to_string(),
        completed,
        user_id: None,
    }
}

pub fn user(id: u64, name: &str) -> User {
    User::from_data(
        id,
        UserData {
            name: name.to_string(),
            username: name.to_lowercase(),
            email: format!("{}@example.com", name.to_lowercase()),
            ..UserData::default()
        },
    )
}

#[derive(Default)]
pub struct FakeTodoApi {
    pub calls: Mutex<Vec<String>>,
    pub list: Script<Vec<Todo>>,
    pub create: Script<Todo>,
    pub update: Script<Todo>,
    pub remove: Script<()>,
}

impl FakeTodoApi {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> String {
        self.calls.lock().unwrap().push(call.clone());
        call
    }
}

#[async_trait]
impl TodoApi for FakeTodoApi {
    async fn list(&self) -> Result<Vec<Todo>, ApiError> {
        let call = self.record("list".to_string());
        self.list.next(&call).await
    }

    async fn create(&self, input: NewTodo) -> Result<Todo, ApiError> {
        let call = self.record(format!("create {}", input.title));
        self.create.next(&call).await
    }

    async fn update(&self, id: u64, todo: Todo) -> Result<Todo, ApiError> {
        let call = self.record(format!("update {id} {} {}", todo.title, todo.completed));
        self.update.next(&call).await
    }

    async fn remove(&self, id: u64) -> Result<(), ApiError> {
        let call = self.record(format!("remove {id}"));
        self.remove.next(&call).await
    }
}

#[derive(Default)]
pub struct FakeUserApi {
    pub calls: Mutex<Vec<String>>,
    pub list: Script<Vec<User>>,
    pub get: Script<User>,
    pub create: Script<User>,
    pub update: Script<User>,
    pub remove: Script<()>,
}

impl FakeUserApi {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> String {
        self.calls.lock().unwrap().push(call.clone());
        call
    }
}

#[async_trait]
impl UserApi for FakeUserApi {
    async fn list(&self) -> Result<Vec<User>, ApiError> {
        let call = self.record("list".to_string());
        self.list.next(&call).await
    }

    async fn get(&self, id: u64) -> Result<User, ApiError> {
        let call = self.record(format!("get {id}"));
        self.get.next(&call).await
    }

    async fn create(&self, data: UserData) -> Result<User, ApiError> {
        let call = self.record(format!("create {}", data.name));
        self.create.next(&call).await
    }

    async fn update(&self, id: u64, data: UserData) -> Result<User, ApiError> {
        let call = self.record(format!("update {id} {}", data.name));
        self.update.next(&call).await
    }

    async fn remove(&self, id: u64) -> Result<(), ApiError> {
        let call = self.record(format!("remove {id}"));
        self.remove.next(&call).await
    }
}

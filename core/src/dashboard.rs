//! Explicit application context holding one store per module.

use std::sync::Arc;

use crate::client::{TodoApi, TodoClient, UserApi, UserClient};
use crate::config::GatewayConfig;
use crate::gateway::Gateway;
use crate::store::{TodoStore, UserStore};

/// The stores for one dashboard session. Built once at startup and passed
/// to whatever needs them; there is no global instance.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub todos: Arc<TodoStore>,
    pub users: Arc<UserStore>,
}

impl Dashboard {
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_gateway(Gateway::new(config))
    }

    pub fn with_gateway(gateway: Gateway) -> Self {
        Self::with_apis(
            Arc::new(TodoClient::new(gateway.clone())),
            Arc::new(UserClient::new(gateway)),
        )
    }

    pub fn with_apis(todos: Arc<dyn TodoApi>, users: Arc<dyn UserApi>) -> Self {
        Self {
            todos: Arc::new(TodoStore::new(todos)),
            users: Arc::new(UserStore::new(users)),
        }
    }

    /// Initial load of both modules.
    pub async fn load(&self) {
        tokio::join!(self.todos.fetch_all(), self.users.fetch_all());
    }
}

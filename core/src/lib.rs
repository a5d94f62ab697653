//! Client-side core of the todo and user dashboard.
//!
//! # Overview
//! Two observable stores (`TodoStore`, `UserStore`) hold the dashboard's
//! in-memory state and drive CRUD calls against a remote REST API through
//! verb-oriented resource clients and a single `Gateway`.
//!
//! # Design
//! - Resource clients split each verb into pure `build_*` / `parse_*`
//!   steps; only the gateway's `Transport` performs I/O.
//! - The gateway runs a request stage (validate, resolve, log) and a
//!   response stage (log, normalize failures) around one transport attempt.
//! - Stores expose state read-only via snapshots and subscriptions and
//!   serialize their own network-backed actions.
//! - `Dashboard` is passed explicitly; nothing is process-global.

pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod gateway;
pub mod http;
pub mod ids;
pub mod interceptor;
pub mod observable;
pub mod store;
pub mod transport;
pub mod types;

pub use client::{TodoApi, TodoClient, UserApi, UserClient};
pub use config::GatewayConfig;
pub use dashboard::Dashboard;
pub use error::{ApiCause, ApiError, ConfigError, GatewayError, Operation, TransportError};
pub use gateway::Gateway;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use ids::{IdGenerator, IdsExhausted};
pub use observable::{Observable, Subscription};
pub use store::{TodoState, TodoStore, UserMode, UserState, UserStore};
pub use transport::{Transport, UreqTransport};
pub use types::{Address, Company, Geo, NewTodo, Todo, User, UserData};

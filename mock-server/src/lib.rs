//! Stand-in for the remote dashboard API.
//!
//! Serves a fixed set of seeded `todos` and `users` and accepts writes
//! without persisting them: creations echo the payload with a placeholder
//! id, updates echo the payload merged with the path id, and deletions
//! answer with an empty object. Unknown ids return 404 with a JSON
//! `message` body.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

/// Id echoed for every created todo.
pub const TODO_PLACEHOLDER_ID: u64 = 201;
/// Id echoed for every created user.
pub const USER_PLACEHOLDER_ID: u64 = 11;

const SEED_USERS: u64 = 10;
const TODOS_PER_USER: u64 = 6;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub user_id: u64,
    pub id: u64,
    pub title: String,
    pub completed: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Geo {
    pub lat: String,
    pub lng: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Address {
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
    pub geo: Geo,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub name: String,
    pub catch_phrase: String,
    pub bs: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub address: Address,
    pub company: Company,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(rename = "_limit")]
    pub limit: Option<usize>,
}

/// Read-only fixtures shared by all handlers.
#[derive(Debug)]
pub struct Fixtures {
    pub todos: Vec<Todo>,
    pub users: Vec<User>,
}

pub type Db = Arc<Fixtures>;

impl Fixtures {
    pub fn seeded() -> Self {
        let users = (1..=SEED_USERS).map(seed_user).collect();
        let todos = (1..=SEED_USERS * TODOS_PER_USER)
            .map(|id| Todo {
                user_id: (id - 1) / TODOS_PER_USER + 1,
                id,
                title: format!("task {id}"),
                completed: id % 3 == 0,
            })
            .collect();
        Self { todos, users }
    }
}

fn seed_user(id: u64) -> User {
    User {
        id,
        name: format!("User {id}"),
        username: format!("user{id}"),
        email: format!("user{id}@example.com"),
        phone: format!("555-010{id}"),
        website: format!("user{id}.example.com"),
        address: Address {
            street: format!("{id} Main Street"),
            suite: format!("Apt. {id}"),
            city: "Springfield".to_string(),
            zipcode: format!("0000{id}"),
            geo: Geo {
                lat: format!("-{id}.0"),
                lng: format!("{id}.0"),
            },
        },
        company: Company {
            name: format!("Company {id}"),
            catch_phrase: "Multi-layered client-server neural-net".to_string(),
            bs: "harness real-time e-markets".to_string(),
        },
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(Fixtures::seeded());
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", get(get_todo).put(update_todo).delete(delete_todo))
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn not_found(resource: &str, id: u64) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": format!("{resource} {id} not found") })),
    )
}

/// Echo `body` with `id` forced onto it, the way the remote API answers
/// writes it never stores.
fn echo_with_id(mut body: Map<String, Value>, id: u64) -> Value {
    body.insert("id".to_string(), Value::from(id));
    Value::Object(body)
}

async fn list_todos(State(db): State<Db>, Query(params): Query<ListParams>) -> Json<Vec<Todo>> {
    let limit = params.limit.unwrap_or(db.todos.len());
    Json(db.todos.iter().take(limit).cloned().collect())
}

async fn get_todo(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Todo>, (StatusCode, Json<Value>)> {
    db.todos
        .iter()
        .find(|t| t.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("todo", id))
}

async fn create_todo(Json(input): Json<Map<String, Value>>) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, Json(echo_with_id(input, TODO_PLACEHOLDER_ID)))
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<Map<String, Value>>,
) -> ApiResult {
    if !db.todos.iter().any(|t| t.id == id) {
        return Err(not_found("todo", id));
    }
    Ok(Json(echo_with_id(input, id)))
}

async fn delete_todo(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult {
    if !db.todos.iter().any(|t| t.id == id) {
        return Err(not_found("todo", id));
    }
    Ok(Json(json!({})))
}

async fn list_users(State(db): State<Db>) -> Json<Vec<User>> {
    Json(db.users.clone())
}

async fn get_user(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<User>, (StatusCode, Json<Value>)> {
    db.users
        .iter()
        .find(|u| u.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("user", id))
}

async fn create_user(Json(input): Json<Map<String, Value>>) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, Json(echo_with_id(input, USER_PLACEHOLDER_ID)))
}

async fn update_user(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<Map<String, Value>>,
) -> ApiResult {
    if !db.users.iter().any(|u| u.id == id) {
        return Err(not_found("user", id));
    }
    Ok(Json(echo_with_id(input, id)))
}

async fn delete_user(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult {
    if !db.users.iter().any(|u| u.id == id) {
        return Err(not_found("user", id));
    }
    Ok(Json(json!({})))
}

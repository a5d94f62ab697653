use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

use super::detached;
use crate::client::TodoApi;
use crate::observable::{Observable, Subscription};
use crate::types::{NewTodo, Todo};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoState {
    /// Newest creations first.
    pub todos: Vec<Todo>,
    pub loading: bool,
    pub error: Option<String>,
}

/// State container for the todo module.
///
/// Network-backed actions hold `actions` for their whole duration, so two
/// overlapping calls run one after the other in issue order. Failures are
/// recorded in `error` and never returned to the caller.
pub struct TodoStore {
    shared: Arc<Shared>,
    actions: Arc<Mutex<()>>,
}

/// The part of the store an action's task carries with it.
struct Shared {
    state: Observable<TodoState>,
    api: Arc<dyn TodoApi>,
}

impl TodoStore {
    pub fn new(api: Arc<dyn TodoApi>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Observable::new(TodoState::default()),
                api,
            }),
            actions: Arc::new(Mutex::new(())),
        }
    }

    pub fn state(&self) -> TodoState {
        self.shared.state.snapshot()
    }

    pub fn todos(&self) -> Vec<Todo> {
        self.shared.state.with(|s| s.todos.clone())
    }

    pub fn loading(&self) -> bool {
        self.shared.state.with(|s| s.loading)
    }

    pub fn error(&self) -> Option<String> {
        self.shared.state.with(|s| s.error.clone())
    }

    pub fn subscribe(&self, listener: impl Fn(&TodoState) + Send + Sync + 'static) -> Subscription {
        self.shared.state.subscribe(listener)
    }

    pub fn subscribe_with_selector<T, F, L>(&self, selector: F, listener: L) -> Subscription
    where
        T: Clone + PartialEq + Send + 'static,
        F: Fn(&TodoState) -> T + Send + Sync + 'static,
        L: Fn(&T, &T) + Send + Sync + 'static,
    {
        self.shared.state.subscribe_with_selector(selector, listener)
    }

    pub fn set_loading(&self, loading: bool) {
        self.shared.state.update(|s| s.loading = loading);
    }

    pub fn set_error(&self, error: Option<String>) {
        self.shared.state.update(|s| s.error = error);
    }

    pub fn clear_error(&self) {
        self.set_error(None);
    }

    /// Replace the list with the server's current todos.
    pub async fn fetch_all(&self) {
        let turn = self.turn().await;
        self.shared.begin_loading();
        detached(turn, Arc::clone(&self.shared).load()).await;
    }

    /// Create a todo and put it at the front once the server confirms it.
    /// Blank titles are ignored without a network call.
    pub async fn add(&self, title: &str) {
        let title = title.trim();
        if title.is_empty() {
            return;
        }

        let turn = self.turn().await;
        self.shared.begin_loading();
        detached(turn, Arc::clone(&self.shared).create(NewTodo::titled(title))).await;
    }

    /// Flip `completed` on the todo with `id`. Unknown ids are ignored.
    /// Leaves `loading` alone.
    pub async fn toggle(&self, id: u64) {
        let turn = self.turn().await;
        let Some(todo) = self.get(id) else {
            return;
        };

        let flipped = Todo {
            completed: !todo.completed,
            ..todo
        };
        self.shared.clear_error();
        detached(turn, Arc::clone(&self.shared).replace(id, flipped)).await;
    }

    /// Change the title of the todo with `id`. Blank or unchanged titles and
    /// unknown ids are ignored. The title is sent as given, surrounding
    /// whitespace included. Leaves `loading` alone.
    pub async fn rename(&self, id: u64, title: &str) {
        if title.trim().is_empty() {
            return;
        }

        let turn = self.turn().await;
        let Some(todo) = self.get(id) else {
            return;
        };
        if todo.title == title {
            return;
        }

        let renamed = Todo {
            title: title.to_string(),
            ..todo
        };
        self.shared.clear_error();
        detached(turn, Arc::clone(&self.shared).replace(id, renamed)).await;
    }

    /// Delete the todo with `id` and drop it from the list. Leaves `loading`
    /// alone.
    pub async fn remove(&self, id: u64) {
        let turn = self.turn().await;
        self.shared.clear_error();
        detached(turn, Arc::clone(&self.shared).delete(id)).await;
    }

    pub fn get(&self, id: u64) -> Option<Todo> {
        self.shared.state.with(|s| s.todos.iter().find(|t| t.id == id).cloned())
    }

    pub fn completed_count(&self) -> usize {
        self.shared.state.with(|s| s.todos.iter().filter(|t| t.completed).count())
    }

    pub fn pending_count(&self) -> usize {
        self.shared.state.with(|s| s.todos.iter().filter(|t| !t.completed).count())
    }

    async fn turn(&self) -> OwnedMutexGuard<()> {
        Arc::clone(&self.actions).lock_owned().await
    }
}

impl Shared {
    async fn load(self: Arc<Self>) {
        match self.api.list().await {
            Ok(todos) => {
                debug!(count = todos.len(), "todos loaded");
                self.state.update(|s| {
                    s.todos = todos;
                    s.loading = false;
                });
            }
            Err(err) => self.fail_loading(err.to_string()),
        }
    }

    async fn create(self: Arc<Self>, input: NewTodo) {
        match self.api.create(input).await {
            Ok(todo) => {
                debug!(id = todo.id, "todo added");
                self.state.update(|s| {
                    s.todos.retain(|t| t.id != todo.id);
                    s.todos.insert(0, todo);
                    s.loading = false;
                });
            }
            Err(err) => self.fail_loading(err.to_string()),
        }
    }

    /// Send `todo` as the new version of `id` and swap it in at the same
    /// position on success.
    async fn replace(self: Arc<Self>, id: u64, todo: Todo) {
        match self.api.update(id, todo).await {
            Ok(updated) => {
                debug!(id, "todo updated");
                self.state.update(|s| {
                    if let Some(slot) = s.todos.iter_mut().find(|t| t.id == id) {
                        *slot = updated;
                    }
                });
            }
            Err(err) => self.fail(err.to_string()),
        }
    }

    async fn delete(self: Arc<Self>, id: u64) {
        match self.api.remove(id).await {
            Ok(()) => {
                debug!(id, "todo removed");
                self.state.update(|s| s.todos.retain(|t| t.id != id));
            }
            Err(err) => self.fail(err.to_string()),
        }
    }

    fn begin_loading(&self) {
        self.state.update(|s| {
            s.loading = true;
            s.error = None;
        });
    }

    fn clear_error(&self) {
        self.state.update(|s| s.error = None);
    }

    fn fail_loading(&self, message: String) {
        warn!(error = %message, "todo action failed");
        self.state.update(|s| {
            s.error = Some(message);
            s.loading = false;
        });
    }

    fn fail(&self, message: String) {
        warn!(error = %message, "todo action failed");
        self.state.update(|s| s.error = Some(message));
    }
}

impl std::fmt::Debug for TodoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoStore").field("state", &self.state()).finish_non_exhaustive()
    }
}

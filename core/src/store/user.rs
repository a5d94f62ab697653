use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

use super::detached;
use crate::client::UserApi;
use crate::error::ApiError;
use crate::observable::{Observable, Subscription};
use crate::types::{User, UserData};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserState {
    /// Newest creations first.
    pub users: Vec<User>,
    pub selected: Option<User>,
    pub loading: bool,
    pub error: Option<String>,
    pub editing: bool,
}

/// Which screen the user module is on, derived from `selected` and
/// `editing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserMode {
    Browsing,
    Viewing(User),
    /// `Some` edits that user, `None` creates a new one.
    Editing(Option<User>),
}

impl UserState {
    pub fn mode(&self) -> UserMode {
        match (&self.selected, self.editing) {
            (_, true) => UserMode::Editing(self.selected.clone()),
            (Some(user), false) => UserMode::Viewing(user.clone()),
            (None, false) => UserMode::Browsing,
        }
    }
}

/// State container for the user module.
///
/// Like `TodoStore`, network-backed actions are serialized per store. Unlike
/// it, `create`, `update` and `remove` hand the failure back to the caller
/// after recording it, so a form can stay open on error.
pub struct UserStore {
    shared: Arc<Shared>,
    actions: Arc<Mutex<()>>,
}

/// The part of the store an action's task carries with it.
struct Shared {
    state: Observable<UserState>,
    api: Arc<dyn UserApi>,
}

impl UserStore {
    pub fn new(api: Arc<dyn UserApi>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Observable::new(UserState::default()),
                api,
            }),
            actions: Arc::new(Mutex::new(())),
        }
    }

    pub fn state(&self) -> UserState {
        self.shared.state.snapshot()
    }

    pub fn users(&self) -> Vec<User> {
        self.shared.state.with(|s| s.users.clone())
    }

    pub fn selected(&self) -> Option<User> {
        self.shared.state.with(|s| s.selected.clone())
    }

    pub fn editing(&self) -> bool {
        self.shared.state.with(|s| s.editing)
    }

    pub fn loading(&self) -> bool {
        self.shared.state.with(|s| s.loading)
    }

    pub fn error(&self) -> Option<String> {
        self.shared.state.with(|s| s.error.clone())
    }

    pub fn mode(&self) -> UserMode {
        self.shared.state.with(UserState::mode)
    }

    pub fn subscribe(&self, listener: impl Fn(&UserState) + Send + Sync + 'static) -> Subscription {
        self.shared.state.subscribe(listener)
    }

    pub fn subscribe_with_selector<T, F, L>(&self, selector: F, listener: L) -> Subscription
    where
        T: Clone + PartialEq + Send + 'static,
        F: Fn(&UserState) -> T + Send + Sync + 'static,
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

    pub fn set_selected(&self, user: Option<User>) {
        self.shared.state.update(|s| s.selected = user);
    }

    pub fn set_editing(&self, editing: bool) {
        self.shared.state.update(|s| s.editing = editing);
    }

    pub fn clear_error(&self) {
        self.set_error(None);
    }

    /// Back to the list: clears both `selected` and `editing`.
    pub fn reset_selection(&self) {
        self.shared.state.update(|s| {
            s.selected = None;
            s.editing = false;
        });
    }

    /// View the listed user with `id`. Returns `false` and changes nothing
    /// if no such user is listed.
    pub fn select(&self, id: u64) -> bool {
        self.shared.state.update(|s| match s.users.iter().find(|u| u.id == id) {
            Some(user) => {
                s.selected = Some(user.clone());
                s.editing = false;
                true
            }
            None => false,
        })
    }

    /// Open the form for a new user.
    pub fn begin_create(&self) {
        self.shared.state.update(|s| {
            s.selected = None;
            s.editing = true;
        });
    }

    /// Open the form for the listed user with `id`. Returns `false` and
    /// changes nothing if no such user is listed.
    pub fn begin_edit(&self, id: u64) -> bool {
        self.shared.state.update(|s| match s.users.iter().find(|u| u.id == id) {
            Some(user) => {
                s.selected = Some(user.clone());
                s.editing = true;
                true
            }
            None => false,
        })
    }

    pub async fn fetch_all(&self) {
        let turn = self.turn().await;
        self.shared.begin_loading();
        detached(turn, Arc::clone(&self.shared).load_all()).await;
    }

    /// Load one user from the server and select it.
    pub async fn fetch_one(&self, id: u64) {
        let turn = self.turn().await;
        self.shared.begin_loading();
        detached(turn, Arc::clone(&self.shared).load_one(id)).await;
    }

    /// Create a user, put it at the front of the list and return to browsing.
    pub async fn create(&self, data: UserData) -> Result<User, ApiError> {
        let turn = self.turn().await;
        self.shared.begin_loading();
        detached(turn, Arc::clone(&self.shared).create(data)).await
    }

    /// Update the user with `id`, replace it in place and show its details.
    pub async fn update(&self, id: u64, data: UserData) -> Result<User, ApiError> {
        let turn = self.turn().await;
        self.shared.begin_loading();
        detached(turn, Arc::clone(&self.shared).update(id, data)).await
    }

    /// Delete the user with `id`. Clears the selection only if it pointed at
    /// the removed user.
    pub async fn remove(&self, id: u64) -> Result<(), ApiError> {
        let turn = self.turn().await;
        self.shared.begin_loading();
        detached(turn, Arc::clone(&self.shared).delete(id)).await
    }

    pub fn user_by_id(&self, id: u64) -> Option<User> {
        self.shared.state.with(|s| s.users.iter().find(|u| u.id == id).cloned())
    }

    pub fn total_users(&self) -> usize {
        self.shared.state.with(|s| s.users.len())
    }

    async fn turn(&self) -> OwnedMutexGuard<()> {
        Arc::clone(&self.actions).lock_owned().await
    }
}

impl Shared {
    async fn load_all(self: Arc<Self>) {
        match self.api.list().await {
            Ok(users) => {
                debug!(count = users.len(), "users loaded");
                self.state.update(|s| {
                    s.users = users;
                    s.loading = false;
                });
            }
            Err(err) => self.fail(&err),
        }
    }

    async fn load_one(self: Arc<Self>, id: u64) {
        match self.api.get(id).await {
            Ok(user) => {
                debug!(id, "user loaded");
                self.state.update(|s| {
                    s.selected = Some(user);
                    s.loading = false;
                });
            }
            Err(err) => self.fail(&err),
        }
    }

    async fn create(self: Arc<Self>, data: UserData) -> Result<User, ApiError> {
        let user = self.api.create(data).await.inspect_err(|err| self.fail(err))?;
        debug!(id = user.id, "user created");
        self.state.update(|s| {
            s.users.retain(|u| u.id != user.id);
            s.users.insert(0, user.clone());
            s.loading = false;
            s.editing = false;
            s.selected = None;
        });
        Ok(user)
    }

    async fn update(self: Arc<Self>, id: u64, data: UserData) -> Result<User, ApiError> {
        let user = self.api.update(id, data).await.inspect_err(|err| self.fail(err))?;
        debug!(id, "user updated");
        self.state.update(|s| {
            if let Some(slot) = s.users.iter_mut().find(|u| u.id == id) {
                *slot = user.clone();
            }
            s.selected = Some(user.clone());
            s.loading = false;
            s.editing = false;
        });
        Ok(user)
    }

    async fn delete(self: Arc<Self>, id: u64) -> Result<(), ApiError> {
        self.api.remove(id).await.inspect_err(|err| self.fail(err))?;
        debug!(id, "user removed");
        self.state.update(|s| {
            s.users.retain(|u| u.id != id);
            if s.selected.as_ref().is_some_and(|u| u.id == id) {
                s.selected = None;
            }
            s.loading = false;
        });
        Ok(())
    }

    fn begin_loading(&self) {
        self.state.update(|s| {
            s.loading = true;
            s.error = None;
        });
    }

    fn fail(&self, err: &ApiError) {
        warn!(error = %err, "user action failed");
        self.state.update(|s| {
            s.error = Some(err.to_string());
            s.loading = false;
        });
    }
}

impl std::fmt::Debug for UserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserStore").field("state", &self.state()).finish_non_exhaustive()
    }
}

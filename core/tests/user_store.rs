//! `UserStore` behavior against a scripted `UserApi`.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{http_error, network_error, user, FakeUserApi, Reply};
use dashboard_core::{Operation, User, UserData, UserMode, UserStore};

fn store() -> (Arc<FakeUserApi>, UserStore) {
    let api = Arc::new(FakeUserApi::default());
    let store = UserStore::new(api.clone());
    (api, store)
}

async fn seeded(users: Vec<User>) -> (Arc<FakeUserApi>, UserStore) {
    let (api, store) = store();
    api.list.push(Reply::Ok(users));
    store.fetch_all().await;
    (api, store)
}

fn data(name: &str) -> UserData {
    user(0, name).data()
}

// --- fetch ---

#[tokio::test]
async fn fetch_all_replaces_users() {
    let (api, store) = store();
    api.list.push(Reply::Ok(vec![user(1, "Ann"), user(2, "Bob")]));

    store.fetch_all().await;

    let state = store.state();
    assert_eq!(state.users, vec![user(1, "Ann"), user(2, "Bob")]);
    assert!(!state.loading);
    assert_eq!(state.error, None);
    assert_eq!(store.total_users(), 2);
}

#[tokio::test]
async fn fetch_all_failure_is_recorded_not_returned() {
    let (api, store) = store();
    api.list.push(Reply::Err(network_error(Operation::FetchUsers)));

    store.fetch_all().await;

    assert!(!store.loading());
    assert_eq!(
        store.error().as_deref(),
        Some("Failed to fetch users: Network Error: No response received from server")
    );
}

#[tokio::test]
async fn fetch_one_selects_user() {
    let (api, store) = store();
    api.get.push(Reply::Ok(user(4, "Dan")));

    store.fetch_one(4).await;

    assert_eq!(store.selected(), Some(user(4, "Dan")));
    assert_eq!(store.mode(), UserMode::Viewing(user(4, "Dan")));
    assert!(!store.loading());
}

#[tokio::test]
async fn fetch_one_failure_keeps_selection() {
    let (api, store) = seeded(vec![user(1, "Ann")]).await;
    assert!(store.select(1));
    api.get.push(Reply::Err(http_error(Operation::FetchUser, 404, "Not Found")));

    store.fetch_one(9).await;

    assert_eq!(store.selected(), Some(user(1, "Ann")));
    assert!(store.error().unwrap().starts_with("Failed to fetch user: API Error: 404"));
}

// --- create ---

#[tokio::test]
async fn create_prepends_and_returns_to_list() {
    let (api, store) = seeded(vec![user(1, "Ann")]).await;
    store.begin_create();
    assert_eq!(store.mode(), UserMode::Editing(None));
    api.create.push(Reply::Ok(user(1_700_000_000_000, "Eve")));

    let created = store.create(data("Eve")).await.unwrap();

    assert_eq!(created.id, 1_700_000_000_000);
    let state = store.state();
    assert_eq!(state.users[0], created);
    assert_eq!(state.users.len(), 2);
    assert!(!state.editing);
    assert_eq!(state.selected, None);
    assert!(!state.loading);
    assert_eq!(store.mode(), UserMode::Browsing);
}

#[tokio::test]
async fn create_failure_records_and_returns_error() {
    let (api, store) = seeded(vec![user(1, "Ann")]).await;
    store.begin_create();
    api.create.push(Reply::Err(http_error(Operation::CreateUser, 500, "Internal Server Error")));

    let err = store.create(data("Eve")).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    let state = store.state();
    assert_eq!(state.error, Some(err.to_string()));
    assert!(!state.loading);
    // The form stays open for another attempt.
    assert!(state.editing);
    assert_eq!(state.users, vec![user(1, "Ann")]);
}

// --- update ---

#[tokio::test]
async fn update_replaces_in_place_and_shows_details() {
    let (api, store) = seeded(vec![user(1, "Ann"), user(2, "Bob"), user(3, "Cy")]).await;
    assert!(store.begin_edit(2));
    api.update.push(Reply::Ok(user(2, "Bobby")));

    let updated = store.update(2, data("Bobby")).await.unwrap();

    let state = store.state();
    assert_eq!(state.users, vec![user(1, "Ann"), updated.clone(), user(3, "Cy")]);
    assert_eq!(state.selected, Some(updated.clone()));
    assert!(!state.editing);
    assert!(!state.loading);
    assert_eq!(store.mode(), UserMode::Viewing(updated));
    assert_eq!(api.calls().last().map(String::as_str), Some("update 2 Bobby"));
}

#[tokio::test]
async fn update_404_records_status_and_rejects() {
    let (api, store) = seeded(vec![user(1, "Ann")]).await;
    assert!(store.begin_edit(1));
    api.update.push(Reply::Err(http_error(Operation::UpdateUser, 404, "Not Found")));

    let result = store.update(1, data("Annie")).await;

    let err = result.unwrap_err();
    assert_eq!(err.status(), Some(404));
    let state = store.state();
    assert!(state.error.as_deref().unwrap().contains("404"));
    assert!(!state.loading);
    assert!(state.editing);
    assert_eq!(state.users, vec![user(1, "Ann")]);
}

// --- remove ---

#[tokio::test]
async fn removing_selected_user_clears_selection() {
    let (api, store) = seeded(vec![user(1, "Ann"), user(2, "Bob")]).await;
    assert!(store.select(2));
    api.remove.push(Reply::Ok(()));

    store.remove(2).await.unwrap();

    assert_eq!(store.selected(), None);
    assert_eq!(store.users(), vec![user(1, "Ann")]);
    assert_eq!(store.mode(), UserMode::Browsing);
}

#[tokio::test]
async fn removing_other_user_keeps_selection() {
    let (api, store) = seeded(vec![user(1, "Ann"), user(2, "Bob")]).await;
    assert!(store.select(2));
    api.remove.push(Reply::Ok(()));

    store.remove(1).await.unwrap();

    assert_eq!(store.selected(), Some(user(2, "Bob")));
    assert_eq!(store.users(), vec![user(2, "Bob")]);
}

#[tokio::test]
async fn remove_failure_records_and_returns_error() {
    let (api, store) = seeded(vec![user(1, "Ann")]).await;
    api.remove.push(Reply::Err(network_error(Operation::DeleteUser)));

    let err = store.remove(1).await.unwrap_err();

    assert!(err.is_network());
    assert_eq!(store.error(), Some(err.to_string()));
    assert_eq!(store.users(), vec![user(1, "Ann")]);
    assert!(!store.loading());
}

// --- selection ---

#[tokio::test]
async fn modes_follow_selection_and_editing() {
    let (_api, store) = seeded(vec![user(1, "Ann")]).await;
    assert_eq!(store.mode(), UserMode::Browsing);

    assert!(store.select(1));
    assert_eq!(store.mode(), UserMode::Viewing(user(1, "Ann")));

    store.set_editing(true);
    assert_eq!(store.mode(), UserMode::Editing(Some(user(1, "Ann"))));

    store.reset_selection();
    assert_eq!(store.mode(), UserMode::Browsing);
    assert!(!store.editing());
}

#[tokio::test]
async fn select_requires_listed_user() {
    let (_api, store) = seeded(vec![user(1, "Ann")]).await;

    assert!(!store.select(5));
    assert!(!store.begin_edit(5));

    assert_eq!(store.selected(), None);
    assert!(!store.editing());
}

#[tokio::test]
async fn direct_setters_drive_mode() {
    let (_api, store) = store();
    store.set_selected(Some(user(3, "Cy")));
    assert_eq!(store.mode(), UserMode::Viewing(user(3, "Cy")));
    store.set_selected(None);
    store.set_editing(true);
    assert_eq!(store.mode(), UserMode::Editing(None));
}

#[tokio::test]
async fn lookup_by_id() {
    let (_api, store) = seeded(vec![user(1, "Ann"), user(2, "Bob")]).await;
    assert_eq!(store.user_by_id(2), Some(user(2, "Bob")));
    assert_eq!(store.user_by_id(3), None);
}

#[tokio::test]
async fn selector_subscription_sees_selection_changes_only() {
    let (api, store) = seeded(vec![user(1, "Ann"), user(2, "Bob")]).await;
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _sub = store.subscribe_with_selector(
        |s| s.selected.as_ref().map(|u| u.id),
        move |now: &Option<u64>, _before: &Option<u64>| sink.lock().unwrap().push(*now),
    );

    store.set_loading(true);
    store.set_loading(false);
    assert!(store.select(1));
    api.remove.push(Reply::Ok(()));
    store.remove(1).await.unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![Some(1), None]);
}

#[tokio::test]
async fn abandoned_create_still_lands_in_the_list() {
    let (api, store) = seeded(vec![user(1, "Ann")]).await;
    store.begin_create();
    api.create.push(Reply::Slow(Duration::from_millis(100), user(2, "Eve")));

    let waited = tokio::time::timeout(Duration::from_millis(10), store.create(data("Eve"))).await;
    assert!(waited.is_err());
    assert!(store.loading());

    tokio::time::sleep(Duration::from_millis(200)).await;

    let state = store.state();
    assert!(!state.loading);
    assert_eq!(state.users, vec![user(2, "Eve"), user(1, "Ann")]);
    assert_eq!(store.mode(), UserMode::Browsing);
}

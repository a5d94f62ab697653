//! Observable stores consumed by the dashboard's views.
//!
//! # Design
//! Each store owns its state in an `Observable` and exposes it read-only:
//! views take snapshots or subscribe, and only the store's own actions
//! write. An action brackets its network call with `loading`/`error`
//! updates and commits the result in one atomic update, so a subscriber
//! never sees a half-applied change.
//!
//! Once an action has taken its turn and touched the state, the request
//! and the commit run on their own task. A caller that stops awaiting the
//! action (a timeout, `select!`, a view going away) does not stop it, so
//! `loading` always settles and the store's turn is handed on afterwards.

mod todo;
mod user;

pub use todo::{TodoState, TodoStore};
pub use user::{UserMode, UserState, UserStore};

use std::future::Future;

use tokio::sync::OwnedMutexGuard;

/// Run `work` to completion on a spawned task while holding `turn`, and
/// wait for its result.
async fn detached<T, F>(turn: OwnedMutexGuard<()>, work: F) -> T
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    let task = tokio::spawn(async move {
        let value = work.await;
        drop(turn);
        value
    });

    match task.await {
        Ok(value) => value,
        Err(err) => match err.try_into_panic() {
            Ok(payload) => std::panic::resume_unwind(payload),
            // Only a runtime shutdown cancels the task; nothing is left to
            // receive the result.
            Err(_) => std::future::pending().await,
        },
    }
}

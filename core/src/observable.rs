//! Observable state container backing both stores.
//!
//! # Design
//! State lives behind a mutex and is only changed through `update`, which
//! applies the mutation atomically and then notifies every listener
//! synchronously with a snapshot of the new state. Listeners are invoked
//! with no lock held, so a listener may read the state, start another
//! update, or drop its own subscription.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Listener<S> = Arc<dyn Fn(&S) + Send + Sync>;

struct Registry<S> {
    next_id: u64,
    entries: Vec<(u64, Listener<S>)>,
}

pub struct Observable<S> {
    state: Mutex<S>,
    registry: Arc<Mutex<Registry<S>>>,
}

impl<S> Observable<S>
where
    S: Clone + Send + 'static,
{
    pub fn new(initial: S) -> Self {
        Self {
            state: Mutex::new(initial),
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    pub fn snapshot(&self) -> S {
        lock(&self.state).clone()
    }

    /// Read the current state without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&lock(&self.state))
    }

    /// Apply `f` atomically, then notify listeners with the new state.
    pub fn update<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let (result, snapshot) = {
            let mut state = lock(&self.state);
            let result = f(&mut state);
            (result, state.clone())
        };
        self.notify(&snapshot);
        result
    }

    pub fn subscribe(&self, listener: impl Fn(&S) + Send + Sync + 'static) -> Subscription {
        let id = {
            let mut registry = lock(&self.registry);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push((id, Arc::new(listener)));
            id
        };

        let registry: Weak<Mutex<Registry<S>>> = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                lock(&registry).entries.retain(|(entry, _)| *entry != id);
            }
        })
    }

    /// Subscribe to a derived slice of the state. `listener` receives
    /// `(current, previous)` and only fires when the slice changes.
    pub fn subscribe_with_selector<T, F, L>(&self, selector: F, listener: L) -> Subscription
    where
        T: Clone + PartialEq + Send + 'static,
        F: Fn(&S) -> T + Send + Sync + 'static,
        L: Fn(&T, &T) + Send + Sync + 'static,
    {
        let last = Mutex::new(self.with(&selector));
        self.subscribe(move |state| {
            let next = selector(state);
            let previous = {
                let mut last = lock(&last);
                if *last == next {
                    return;
                }
                std::mem::replace(&mut *last, next.clone())
            };
            listener(&next, &previous);
        })
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.registry).entries.len()
    }

    fn notify(&self, state: &S) {
        let listeners: Vec<Listener<S>> = lock(&self.registry)
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(state);
        }
    }
}

impl<S: Default + Clone + Send + 'static> Default for Observable<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

/// Handle for a registered listener. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Keep the listener registered for the life of the container.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Counter {
        value: i32,
        label: String,
    }

    #[test]
    fn update_notifies_with_new_state() {
        let obs = Observable::new(Counter::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = obs.subscribe(move |s: &Counter| sink.lock().unwrap().push(s.value));

        obs.update(|s| s.value = 1);
        obs.update(|s| s.value += 2);

        assert_eq!(*seen.lock().unwrap(), vec![1, 3]);
        assert_eq!(obs.snapshot().value, 3);
    }

    #[test]
    fn update_returns_closure_result() {
        let obs = Observable::new(Counter::default());
        let old = obs.update(|s| std::mem::replace(&mut s.value, 9));
        assert_eq!(old, 0);
        assert_eq!(obs.with(|s| s.value), 9);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let obs = Observable::new(Counter::default());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let sub = obs.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        obs.update(|s| s.value = 1);
        sub.unsubscribe();
        obs.update(|s| s.value = 2);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(obs.listener_count(), 0);
    }

    #[test]
    fn detached_subscription_stays_registered() {
        let obs = Observable::new(Counter::default());
        obs.subscribe(|_| {}).detach();
        assert_eq!(obs.listener_count(), 1);
    }

    #[test]
    fn selector_fires_only_on_slice_change() {
        let obs = Observable::new(Counter::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = obs.subscribe_with_selector(
            |s: &Counter| s.label.clone(),
            move |now: &String, before: &String| sink.lock().unwrap().push((before.clone(), now.clone())),
        );

        obs.update(|s| s.value = 5);
        obs.update(|s| s.label = "a".to_string());
        obs.update(|s| s.label = "a".to_string());
        obs.update(|s| s.label = "b".to_string());

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (String::new(), "a".to_string()),
                ("a".to_string(), "b".to_string())
            ]
        );
    }

    #[test]
    fn listener_may_update_reentrantly() {
        let obs = Arc::new(Observable::new(Counter::default()));
        let inner = Arc::clone(&obs);
        let _sub = obs.subscribe(move |s: &Counter| {
            if s.value == 1 && s.label.is_empty() {
                inner.update(|s| s.label = "seen one".to_string());
            }
        });

        obs.update(|s| s.value = 1);
        assert_eq!(obs.snapshot().label, "seen one");
    }

    #[test]
    fn subscription_outliving_container_is_harmless() {
        let obs = Observable::new(Counter::default());
        let sub = obs.subscribe(|_| {});
        drop(obs);
        drop(sub);
    }
}

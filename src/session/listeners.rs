//! Typed listener registry
//!
//! One `ListenerSet` per event kind. Subscribing returns a [`Subscription`]
//! that removes the callback when dropped, so a consumer that registers on
//! mount and drops its handles on unmount never leaks callbacks across
//! repeated session creation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::error::SessionError;
use crate::session::events::{LanguagePrompt, ParticipantEvent, Question, SetupInfo, Summary};
use crate::session::state::ConnectionState;
use crate::session::transcript::ChatMessage;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

// A panic elsewhere must not silently drop subscribers or events
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Entries<T> {
    next_id: AtomicU64,
    callbacks: Mutex<Vec<(u64, Callback<T>)>>,
}

/// Multi-subscriber fan-out for one event kind, invoked in insertion order
pub struct ListenerSet<T> {
    entries: Arc<Entries<T>>,
}

impl<T: 'static> ListenerSet<T> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Entries {
                next_id: AtomicU64::new(0),
                callbacks: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.entries.next_id.fetch_add(1, Ordering::SeqCst);
        lock(&self.entries.callbacks).push((id, Arc::new(callback)));

        let weak: Weak<Entries<T>> = Arc::downgrade(&self.entries);
        Subscription {
            remove: Some(Box::new(move || {
                if let Some(entries) = weak.upgrade() {
                    lock(&entries.callbacks).retain(|(cid, _)| *cid != id);
                }
            })),
        }
    }

    /// Invoke every subscriber with `value`
    ///
    /// The list is snapshotted first so callbacks can subscribe or dispose.
    pub fn emit(&self, value: &T) {
        let snapshot: Vec<Callback<T>> = lock(&self.entries.callbacks)
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        for callback in snapshot {
            callback(value);
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.entries.callbacks).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for ListenerSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Disposer handle returned by every subscribe call
#[must_use = "dropping a Subscription removes the listener; call detach() to keep it"]
pub struct Subscription {
    remove: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn dispose(mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }

    /// Keep the listener registered for the lifetime of the registry
    pub fn detach(mut self) {
        self.remove = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

/// All listener sets owned by one session
#[derive(Default)]
pub struct Listeners {
    pub message: ListenerSet<ChatMessage>,
    pub status: ListenerSet<ConnectionState>,
    pub error: ListenerSet<SessionError>,
    pub participant: ListenerSet<ParticipantEvent>,
    pub language_prompt: ListenerSet<LanguagePrompt>,
    pub summary: ListenerSet<Summary>,
    pub question: ListenerSet<Question>,
    pub setup_info: ListenerSet<SetupInfo>,
}

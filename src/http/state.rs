use crate::config::Config;
use crate::session::{ConnectionState, InterviewSession};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::sync::RwLock;
use tracing::info;

type SessionMap = HashMap<String, Arc<dyn InterviewSession>>;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Live sessions (session_id → session)
    pub sessions: Arc<RwLock<SessionMap>>,

    /// Endpoints and timeouts new sessions are created with
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config: Arc::new(config),
        }
    }

    pub async fn get(&self, session_id: &str) -> Option<Arc<dyn InterviewSession>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Register a configured session; it is dropped from the map once it
    /// reaches `Disconnected`, whichever side closed the socket
    pub async fn insert(&self, session: Arc<dyn InterviewSession>) {
        let session_id = session.session_id().to_string();
        self.sessions
            .write()
            .await
            .insert(session_id.clone(), Arc::clone(&session));

        // The listener holds the map weakly so a session never keeps it alive
        let sessions = Arc::downgrade(&self.sessions);
        let id = session_id.clone();
        session
            .subscribe_status(Box::new(move |state: &ConnectionState| {
                if *state == ConnectionState::Disconnected {
                    prune(&sessions, &id);
                }
            }))
            .detach();

        // Closed between configure and subscribe
        if session.state() == ConnectionState::Disconnected {
            self.sessions.write().await.remove(&session_id);
        }
    }
}

fn prune(sessions: &Weak<RwLock<SessionMap>>, session_id: &str) {
    let Some(sessions) = sessions.upgrade() else {
        return;
    };
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        return;
    };

    let session_id = session_id.to_string();
    runtime.spawn(async move {
        if sessions.write().await.remove(&session_id).is_some() {
            info!("Session {} disconnected; removed", session_id);
        }
    });
}

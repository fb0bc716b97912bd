use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Opaque per-client session key, carried by the client between requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-client authentication state.
///
/// Invariant: `authenticated` is true exactly when `user` is set; both flip
/// together on login and logout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub authenticated: bool,
    pub user: Option<String>,
    pub authenticated_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn logged_out() -> Self {
        Self {
            authenticated: false,
            user: None,
            authenticated_at: None,
        }
    }

    pub fn logged_in(user: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            authenticated: true,
            user: Some(user.into()),
            authenticated_at: Some(at),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::logged_out()
    }
}

/// Storage abstraction so the service can be exercised without a server.
///
/// Implementations hold one isolated `Session` per id; clients never observe
/// each other's state.
pub trait SessionStore: Send + Sync {
    fn fetch(&self, id: &SessionId) -> Result<Option<Session>, SessionStoreError>;
    fn store(&self, id: &SessionId, session: Session) -> Result<(), SessionStoreError>;
    fn remove(&self, id: &SessionId) -> Result<(), SessionStoreError>;
}

/// Error enumeration for session store failures.
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// Process-local store backing the default deployment; sessions live for the
/// lifetime of the process and are dropped on teardown.
#[derive(Default, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, Session>>>,
}

impl SessionStore for InMemorySessionStore {
    fn fetch(&self, id: &SessionId) -> Result<Option<Session>, SessionStoreError> {
        let guard = self.sessions.lock().expect("session mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn store(&self, id: &SessionId, session: Session) -> Result<(), SessionStoreError> {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        guard.insert(id.clone(), session);
        Ok(())
    }

    fn remove(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        guard.remove(id);
        Ok(())
    }
}

impl InMemorySessionStore {
    /// Number of live sessions, for tests and diagnostics.
    pub fn len(&self) -> usize {
        self.sessions.lock().expect("session mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> SessionId {
        SessionId(raw.to_string())
    }

    #[test]
    fn default_session_is_logged_out() {
        let session = Session::default();
        assert!(!session.authenticated);
        assert!(session.user.is_none());
        assert!(session.authenticated_at.is_none());
    }

    #[test]
    fn logged_in_session_carries_user_and_timestamp() {
        let now = Utc::now();
        let session = Session::logged_in("agent@example.com", now);
        assert!(session.authenticated);
        assert_eq!(session.user.as_deref(), Some("agent@example.com"));
        assert_eq!(session.authenticated_at, Some(now));
    }

    #[test]
    fn store_round_trips_sessions_per_id() {
        let store = InMemorySessionStore::default();
        let now = Utc::now();
        store
            .store(&id("sess-a"), Session::logged_in("agent@example.com", now))
            .expect("store");

        let fetched = store.fetch(&id("sess-a")).expect("fetch");
        assert_eq!(fetched, Some(Session::logged_in("agent@example.com", now)));
        assert_eq!(store.fetch(&id("sess-b")).expect("fetch"), None);
    }

    #[test]
    fn remove_is_idempotent() {
        let store = InMemorySessionStore::default();
        store.remove(&id("never-seen")).expect("remove unknown id");
        store
            .store(&id("sess-a"), Session::logged_in("agent@example.com", Utc::now()))
            .expect("store");
        store.remove(&id("sess-a")).expect("remove");
        store.remove(&id("sess-a")).expect("remove again");
        assert!(store.is_empty());
    }
}

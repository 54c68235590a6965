use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;

/// Proof of a successful login, identified by an opaque token. Held only in
/// memory; every session dies with the process.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub name: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// In-memory token → session map with pull-based TTL semantics.
///
/// Expiry is only ever evaluated at access time: an expired session sits in
/// the map until the first `get` after its deadline evicts it. There is no
/// background sweep. The lock exists because tokio may run handlers on
/// multiple threads; within one process this is the only shared mutable
/// structure the auth core has.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, session: Session) {
        self.sessions
            .write()
            .insert(session.token.clone(), session);
    }

    /// Look up a live session. A session found past its deadline is evicted
    /// as a side effect and reported as absent.
    pub fn get(&self, token: &str, now: DateTime<Utc>) -> Option<Session> {
        let expired = {
            let sessions = self.sessions.read();
            match sessions.get(token) {
                Some(session) if now < session.expires_at => return Some(session.clone()),
                Some(_) => true,
                None => false,
            }
        };

        if expired {
            self.sessions.write().remove(token);
        }
        None
    }

    /// Drop the token if present. Unknown tokens are fine (idempotent).
    pub fn remove(&self, token: &str) {
        self.sessions.write().remove(token);
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

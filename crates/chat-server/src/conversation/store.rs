use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::{Mutex, RwLock};

use super::Transcript;

pub(crate) struct Session {
    pub(crate) created_at: SystemTime,
    /// Held across the model call so one session's exchanges never interleave.
    pub(crate) transcript: Mutex<Transcript>,
}

/// Live sessions keyed by id. Volatile; nothing survives a restart.
///
/// The map lock only guards lookup and insert. Each session carries its own
/// mutex, so requests for different sessions never wait on each other.
#[derive(Default)]
pub(crate) struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
}

impl SessionStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn insert(&self, session_id: String, transcript: Transcript) {
        let session = Arc::new(Session {
            created_at: SystemTime::now(),
            transcript: Mutex::new(transcript),
        });
        self.sessions.write().await.insert(session_id, session);
    }

    pub(crate) async fn get(&self, session_id: &str) -> Option<Arc<Session>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    pub(crate) async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

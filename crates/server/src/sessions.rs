//! # Session History
//!
//! Chat history keyed by session id. Each session owns its ordered turn
//! list, so clearing or continuing one conversation never touches another
//! visitor's. A single process-wide buffer is exactly the failure mode this
//! store exists to rule out.

use jewelrybox::types::ChatTurn;
use std::collections::HashMap;
use std::sync::RwLock;

/// A process-local store of per-session conversation turns.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Vec<ChatTurn>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the session's turns, oldest first. Unknown
    /// session ids yield an empty history.
    pub fn history(&self, session_id: &str) -> Vec<ChatTurn> {
        self.sessions
            .read()
            .expect("session store lock poisoned")
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Appends one user/assistant exchange to the session.
    pub fn append_exchange(&self, session_id: &str, user_input: &str, reply: &str) {
        let mut sessions = self.sessions.write().expect("session store lock poisoned");
        let turns = sessions.entry(session_id.to_string()).or_default();
        turns.push(ChatTurn::user(user_input));
        turns.push(ChatTurn::assistant(reply));
    }

    /// Clears one session's history.
    pub fn clear(&self, session_id: &str) {
        self.sessions
            .write()
            .expect("session store lock poisoned")
            .remove(session_id);
    }

    /// Clears every session (the legacy global reset).
    pub fn clear_all(&self) {
        self.sessions
            .write()
            .expect("session store lock poisoned")
            .clear();
    }
}

//! Resolution and ownership of session state.

use super::types::SessionState;
use crate::http::RouteRequest;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Requests carrying this header get their own isolated session context.
/// Everything else shares the global one.
pub const SESSION_HEADER: &str = "mimic-session";

/// Owns every [`SessionState`] and resolves exactly one per request.
///
/// Resolution never fails: an unknown session id synthesizes a fresh,
/// fully initialized state on first sight. Repeated resolutions for the
/// same logical context return the same `Arc`, so mutations made by one
/// handler are visible to later handlers and later requests.
///
/// States are handed out as `Arc<Mutex<SessionState>>`. The lock contract:
/// take the lock, apply the whole read-then-write step, release before any
/// `.await`. Handlers must not retain the reference past their call.
pub struct StateStore {
    /// Context for requests without a session header.
    global: Arc<Mutex<SessionState>>,
    /// Per-session contexts keyed by the session header value.
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionState>>>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            global: Arc::new(Mutex::new(SessionState::new())),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve the state for a request.
    pub fn matching_state(&self, req: &RouteRequest) -> Arc<Mutex<SessionState>> {
        match req.header(SESSION_HEADER) {
            Some(id) if !id.is_empty() => self.session_state(id),
            _ => Arc::clone(&self.global),
        }
    }

    fn session_state(&self, id: &str) -> Arc<Mutex<SessionState>> {
        if let Some(state) = self.sessions.read().get(id) {
            return Arc::clone(state);
        }

        let mut sessions = self.sessions.write();
        // Racing resolvers for the same id must agree on one state.
        let state = sessions
            .entry(id.to_string())
            .or_insert_with(|| {
                debug!(session = id, "synthesizing fresh session state");
                Arc::new(Mutex::new(SessionState::new()))
            });
        Arc::clone(state)
    }

    /// Number of non-global contexts currently alive.
    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

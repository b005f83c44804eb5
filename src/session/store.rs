use crate::session::{reduce, RequestToken, SessionEvent, SessionState};
use crate::validation::TicketValidator;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Shared handle to one session's state
///
/// Clones refer to the same session. Tokens are drawn from a counter that
/// survives `Reset`, so a token is never reused within a session.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<RwLock<SessionState>>,
    next_token: Arc<AtomicU64>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState::default())),
            next_token: Arc::new(AtomicU64::new(1)),
        }
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn dispatch(&self, event: SessionEvent) -> SessionState {
        let mut state = self.state.write().await;
        *state = reduce(&state, event);
        state.clone()
    }

    /// Validate whatever address the session currently holds
    ///
    /// The result is applied only if no newer input, reset, or validation
    /// happened while the contract calls were in flight.
    pub async fn validate_current(&self, validator: &TicketValidator) -> SessionState {
        let (token, address) = self.start().await;

        let outcome = validator.validate(&address).await;

        let mut state = self.state.write().await;
        if state.pending_token != Some(token) {
            debug!("Discarding stale validation result for token {}", token);
        }
        *state = reduce(&state, SessionEvent::ValidationResolved { token, outcome });
        state.clone()
    }

    async fn start(&self) -> (RequestToken, String) {
        let token = self.next_token.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write().await;
        *state = reduce(&state, SessionEvent::ValidationStarted(token));
        (token, state.address.clone())
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// All live sessions of the API server, keyed by session id
///
/// Sessions idle for longer than `idle_ttl` are evicted on the next `open`.
/// When the registry is still full after that, the least recently used
/// session makes room for the new one.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    next_id: AtomicU64,
    max_sessions: usize,
    idle_ttl: Duration,
}

struct SessionEntry {
    store: SessionStore,
    last_seen: Instant,
    // open order, breaks ties between equal `last_seen`
    seq: u64,
}

impl SessionRegistry {
    pub fn new(max_sessions: usize, idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            max_sessions: max_sessions.max(1),
            idle_ttl,
        }
    }

    /// Create an empty session and return its id
    pub async fn open(&self) -> String {
        let seq = self.next_id.fetch_add(1, Ordering::SeqCst);
        let id = format!("session-{}", seq);
        let now = Instant::now();

        let mut sessions = self.sessions.write().await;

        // Drop idle sessions first
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < self.idle_ttl);
        if sessions.len() < before {
            debug!("Evicted {} idle sessions", before - sessions.len());
        }

        // Still full: make room by dropping the least recently used one
        if sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| (entry.last_seen, entry.seq))
                .map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                warn!("Session limit {} reached, evicting {}", self.max_sessions, oldest);
                sessions.remove(&oldest);
            }
        }

        sessions.insert(
            id.clone(),
            SessionEntry {
                store: SessionStore::new(),
                last_seen: now,
                seq,
            },
        );
        id
    }

    /// Look a session up and mark it as recently used
    pub async fn get(&self, id: &str) -> Option<SessionStore> {
        let mut sessions = self.sessions.write().await;
        let expired = sessions.get(id)?.last_seen.elapsed() >= self.idle_ttl;
        if expired {
            sessions.remove(id);
            return None;
        }

        let entry = sessions.get_mut(id)?;
        entry.last_seen = Instant::now();
        Some(entry.store.clone())
    }

    /// Remove a session. Returns whether it existed.
    pub async fn close(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

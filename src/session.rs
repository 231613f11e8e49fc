//! Session storage for concurrent HTTP players.
//!
//! The store holds at most `capacity` sessions. Each session sits behind its
//! own mutex so requests for different players never wait on each other; the
//! table lock is only held while resolving a token.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use derive_getters::Getters;
use derive_new::new;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::games::cricket::GameState;

/// Default number of concurrent sessions.
pub const DEFAULT_CAPACITY: usize = 100;

/// Default inactivity before a session may be reclaimed, in seconds.
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 3600;

/// Opaque session identifier.
pub type SessionToken = String;

/// Errors raised by the session store.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum StoreError {
    /// Every slot is live and none has expired.
    #[display("All {} session slots are in use", capacity)]
    PoolExhausted {
        /// Configured capacity.
        capacity: usize,
    },
}

impl std::error::Error for StoreError {}

/// One player's session.
#[derive(Debug, Clone, Getters, Serialize)]
pub struct Session {
    /// Token the client presents.
    token: SessionToken,
    /// The game.
    state: GameState,
}

impl Session {
    fn new(token: SessionToken) -> Self {
        Self {
            token,
            state: GameState::new(),
        }
    }

    /// Mutable access to the game, for the engine.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }
}

/// Shared handle to one session; lock it to read or mutate the game.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Outcome of [`SessionStore::resolve`].
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    token: SessionToken,
    handle: SessionHandle,
    created: bool,
}

impl ResolvedSession {
    /// Token to send back to the client.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether a new session was allocated for this request.
    pub fn created(&self) -> bool {
        self.created
    }

    /// Locks the session for exclusive access.
    pub fn lock(&self) -> MutexGuard<'_, Session> {
        lock(&self.handle)
    }
}

#[derive(Debug, new)]
struct Slot {
    handle: SessionHandle,
    last_activity: DateTime<Utc>,
}

/// Fixed-capacity store of game sessions keyed by token.
#[derive(Debug, Clone)]
pub struct SessionStore {
    slots: Arc<Mutex<HashMap<SessionToken, Slot>>>,
    capacity: usize,
    timeout: Duration,
}

impl SessionStore {
    /// Creates a store with the given capacity and inactivity timeout.
    #[instrument]
    pub fn new(capacity: usize, timeout: std::time::Duration) -> Self {
        info!("Creating session store");
        Self {
            slots: Arc::new(Mutex::new(HashMap::with_capacity(capacity))),
            capacity,
            timeout: Duration::from_std(timeout).unwrap_or(Duration::MAX),
        }
    }

    /// Maximum number of concurrent sessions.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of sessions currently held, expired or not.
    pub fn len(&self) -> usize {
        lock(&self.slots).len()
    }

    /// Whether the store holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finds the session for `token`, or allocates a new one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PoolExhausted`] when the store is full and no
    /// session has been idle past the timeout.
    pub fn resolve(&self, token: Option<&str>) -> Result<ResolvedSession, StoreError> {
        self.resolve_at(token, Utc::now())
    }

    /// [`resolve`](Self::resolve) with an explicit clock reading.
    #[instrument(skip(self))]
    pub fn resolve_at(
        &self,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ResolvedSession, StoreError> {
        let mut slots = lock(&self.slots);

        if let Some(token) = token
            && let Some(slot) = slots.get_mut(token)
        {
            if !self.is_expired(slot, now) {
                slot.last_activity = now;
                debug!(token, "Resolved existing session");
                return Ok(ResolvedSession {
                    token: token.to_string(),
                    handle: Arc::clone(&slot.handle),
                    created: false,
                });
            }
            debug!(token, "Presented session has expired");
        }

        if slots.len() >= self.capacity {
            let oldest = slots
                .iter()
                .filter(|(_, slot)| self.is_expired(slot, now))
                .min_by_key(|(_, slot)| slot.last_activity)
                .map(|(token, _)| token.clone());

            match oldest {
                Some(stale) => {
                    slots.remove(&stale);
                    info!(token = %stale, "Reclaimed expired session");
                }
                None => {
                    warn!(capacity = self.capacity, "Session pool exhausted");
                    return Err(StoreError::PoolExhausted {
                        capacity: self.capacity,
                    });
                }
            }
        }

        let token = loop {
            let candidate = Uuid::new_v4().simple().to_string();
            if !slots.contains_key(&candidate) {
                break candidate;
            }
            debug!("Session token collision, regenerating");
        };

        let handle = Arc::new(Mutex::new(Session::new(token.clone())));
        slots.insert(token.clone(), Slot::new(Arc::clone(&handle), now));
        info!(token = %token, live = slots.len(), "Created new session");

        Ok(ResolvedSession {
            token,
            handle,
            created: true,
        })
    }

    /// Lists the tokens of all held sessions.
    #[instrument(skip(self))]
    pub fn tokens(&self) -> Vec<SessionToken> {
        let tokens: Vec<_> = lock(&self.slots).keys().cloned().collect();
        debug!(count = tokens.len(), "Listed sessions");
        tokens
    }

    fn is_expired(&self, slot: &Slot, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(slot.last_activity) > self.timeout
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(
            DEFAULT_CAPACITY,
            std::time::Duration::from_secs(DEFAULT_SESSION_TIMEOUT_SECS),
        )
    }
}

/// Locks a mutex, recovering the data if a previous holder panicked.
///
/// Game state is only written after validation, so a poisoned guard still
/// holds a consistent value.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
        warn!("Recovering poisoned session lock");
        poisoned.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expired_presented_token_gets_fresh_session() {
        let store = SessionStore::new(4, std::time::Duration::from_secs(60));
        let start = Utc::now();
        let first = store.resolve_at(None, start).unwrap();

        let later = start + Duration::seconds(61);
        let second = store.resolve_at(Some(first.token()), later).unwrap();
        assert!(second.created());
        assert_ne!(second.token(), first.token());
    }

    #[test]
    fn test_access_refreshes_activity() {
        let store = SessionStore::new(1, std::time::Duration::from_secs(60));
        let start = Utc::now();
        let first = store.resolve_at(None, start).unwrap();

        store
            .resolve_at(Some(first.token()), start + Duration::seconds(50))
            .unwrap();
        let again = store
            .resolve_at(Some(first.token()), start + Duration::seconds(100))
            .unwrap();
        assert!(!again.created());
        assert_eq!(again.token(), first.token());
    }
}

//! Per-user session cache
//!
//! The in-memory map is authoritative within a process lifetime; the
//! storage snapshot is authoritative across restarts. Reads fall back to
//! storage on a cache miss; writes go to the cache first and to storage
//! best-effort (a failed snapshot write is logged, never surfaced).

use fieldnote_domain::traits::SessionStore;
use fieldnote_domain::SessionState;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Mutex-guarded session cache keyed by user id.
#[derive(Default)]
pub struct SessionTracker {
    cache: Mutex<HashMap<String, SessionState>>,
}

impl SessionTracker {
    /// New empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current session for a user: cache hit, else storage snapshot, else a
    /// fresh default.
    pub fn get<S: SessionStore>(&self, store: &S, user_id: &str) -> SessionState {
        if let Some(state) = self.lock().get(user_id) {
            return state.clone();
        }
        match store.load_session(user_id) {
            Ok(Some(state)) => {
                debug!(user_id, "session restored from storage");
                self.lock().insert(user_id.to_string(), state.clone());
                state
            }
            Ok(None) => SessionState::default(),
            Err(_) => {
                warn!(user_id, "session snapshot load failed; starting fresh");
                SessionState::default()
            }
        }
    }

    /// Replace a user's session. The cache update always succeeds; the
    /// storage snapshot is best-effort.
    pub fn put<S: SessionStore>(&self, store: &mut S, user_id: &str, state: SessionState) {
        self.lock().insert(user_id.to_string(), state.clone());
        if store.save_session(user_id, &state).is_err() {
            warn!(user_id, "session snapshot write failed; cache still updated");
        }
    }

    /// Drop a user's session from cache and storage.
    pub fn clear<S: SessionStore>(&self, store: &mut S, user_id: &str) {
        self.lock().remove(user_id);
        if store.delete_session(user_id).is_err() {
            warn!(user_id, "session snapshot delete failed");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, SessionState>> {
        match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldnote_domain::SessionState;
    use std::convert::Infallible;

    /// Storage stub that remembers the last snapshot per user.
    #[derive(Default)]
    struct MemorySessions {
        saved: HashMap<String, SessionState>,
    }

    impl SessionStore for MemorySessions {
        type Error = Infallible;

        fn load_session(&self, user_id: &str) -> Result<Option<SessionState>, Self::Error> {
            Ok(self.saved.get(user_id).cloned())
        }

        fn save_session(&mut self, user_id: &str, state: &SessionState) -> Result<(), Self::Error> {
            self.saved.insert(user_id.to_string(), state.clone());
            Ok(())
        }

        fn delete_session(&mut self, user_id: &str) -> Result<(), Self::Error> {
            self.saved.remove(user_id);
            Ok(())
        }
    }

    #[test]
    fn test_miss_falls_back_to_storage() {
        let tracker = SessionTracker::new();
        let mut store = MemorySessions::default();
        store
            .saved
            .insert("tech-1".to_string(), SessionState::with_site("maos_ep"));

        let state = tracker.get(&store, "tech-1");
        assert_eq!(state.active_site.as_deref(), Some("maos_ep"));
    }

    #[test]
    fn test_put_updates_cache_and_storage() {
        let tracker = SessionTracker::new();
        let mut store = MemorySessions::default();

        tracker.put(&mut store, "tech-1", SessionState::with_site("cilacap_pl"));
        assert_eq!(
            tracker.get(&store, "tech-1").active_site.as_deref(),
            Some("cilacap_pl")
        );
        assert!(store.saved.contains_key("tech-1"));
    }

    #[test]
    fn test_clear_removes_both() {
        let tracker = SessionTracker::new();
        let mut store = MemorySessions::default();
        tracker.put(&mut store, "tech-1", SessionState::with_site("maos_ep"));

        tracker.clear(&mut store, "tech-1");
        assert!(tracker.get(&store, "tech-1").active_site.is_none());
        assert!(store.saved.is_empty());
    }

    #[test]
    fn test_unknown_user_gets_default() {
        let tracker = SessionTracker::new();
        let store = MemorySessions::default();
        let state = tracker.get(&store, "nobody");
        assert!(state.is_empty());
    }
}

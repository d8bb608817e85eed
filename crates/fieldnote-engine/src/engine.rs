//! Engine coordinator
//!
//! One `Engine` owns the storage backend, the session cache, and the clock.
//! All operations go through its methods; concurrent callers are serialized
//! by the admission scheduler upstream, the internal mutex only guards
//! against misuse.

use crate::config::EngineConfig;
use crate::session::SessionTracker;
use chrono::NaiveDate;
use fieldnote_dates::parse_day_first;
use fieldnote_domain::traits::{NoteStore, SessionStore, SiteDirectory};
use fieldnote_domain::{Clock, SessionState, Timestamp};
use std::sync::{Mutex, MutexGuard};

/// Storage backend the engine requires: notes, sessions, and the site
/// directory behind one error type.
pub trait Backend:
    NoteStore<Error = Self::BackendError>
    + SessionStore<Error = Self::BackendError>
    + SiteDirectory<Error = Self::BackendError>
{
    /// Unified storage error.
    type BackendError: std::error::Error + Send + Sync + 'static;
}

impl<T, E> Backend for T
where
    E: std::error::Error + Send + Sync + 'static,
    T: NoteStore<Error = E> + SessionStore<Error = E> + SiteDirectory<Error = E>,
{
    type BackendError = E;
}

/// The field-note engine: capture, reconcile, view, recap, export.
pub struct Engine<S: Backend> {
    pub(crate) store: Mutex<S>,
    pub(crate) sessions: SessionTracker,
    pub(crate) clock: Box<dyn Clock + Send + Sync>,
    pub(crate) config: EngineConfig,
}

impl<S: Backend> Engine<S> {
    /// Build an engine over a storage backend with the default config.
    pub fn new(store: S, clock: Box<dyn Clock + Send + Sync>) -> Self {
        Self::with_config(store, clock, EngineConfig::default())
    }

    /// Build an engine with explicit configuration.
    pub fn with_config(
        store: S,
        clock: Box<dyn Clock + Send + Sync>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store: Mutex::new(store),
            sessions: SessionTracker::new(),
            clock,
            config,
        }
    }

    /// Current session for a user (cache, then storage, then default).
    pub fn session(&self, user_id: &str) -> SessionState {
        let store = self.lock_store();
        self.sessions.get(&*store, user_id)
    }

    /// Delete a user's session entirely.
    pub fn clear_session(&self, user_id: &str) {
        let mut store = self.lock_store();
        self.sessions.clear(&mut *store, user_id);
    }

    pub(crate) fn lock_store(&self) -> MutexGuard<'_, S> {
        match self.store.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub(crate) fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Today's calendar date, derived from the clock's canonical date key.
    pub(crate) fn today(&self) -> NaiveDate {
        let ts = self.clock.now();
        parse_day_first(&ts.date, chrono::Local::now().date_naive())
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

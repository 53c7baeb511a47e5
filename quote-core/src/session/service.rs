use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::session::record::PersistedSession;
use crate::session::store::{SessionStore, SessionStoreError};

/// Storage key of the resumable session.
pub const SESSION_KEY: &str = "moovinleads_review";

/// Typed read/write access to the resumable session.
///
/// Only the wizard controller talks to this service.
#[derive(Debug)]
pub struct ResumeService<S> {
    store: S,
    key: String,
}

impl<S: SessionStore> ResumeService<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, SESSION_KEY)
    }

    pub fn with_key(
        store: S,
        key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads the stored session if it can still be resumed on `today`.
    ///
    /// Missing, unreadable, unparsable and past-dated records all yield
    /// `None`.
    pub fn load_resumable(
        &self,
        today: NaiveDate,
    ) -> Option<PersistedSession> {
        let raw = match self.store.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(key = %self.key, error = %err, "could not read saved session");
                return None;
            }
        };

        let session: PersistedSession = match serde_json::from_str(&raw) {
            Ok(session) => session,
            Err(err) => {
                warn!(key = %self.key, error = %err, "ignoring unreadable saved session");
                return None;
            }
        };

        if session.is_resumable(today) {
            Some(session)
        } else {
            debug!(
                key = %self.key,
                move_date = ?session.form_data.move_date,
                "saved session is past its move date"
            );
            None
        }
    }

    /// # Errors
    ///
    /// Returns [`SessionStoreError`] if encoding or the store write fails.
    pub fn save(
        &self,
        session: &PersistedSession,
    ) -> Result<(), SessionStoreError> {
        let json = serde_json::to_string(session)?;
        self.store.write(&self.key, &json)
    }

    /// # Errors
    ///
    /// Returns [`SessionStoreError`] if the store cannot remove the record.
    pub fn discard(&self) -> Result<(), SessionStoreError> {
        self.store.remove(&self.key)
    }
}

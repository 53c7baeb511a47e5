//! Resumable session persistence.

pub mod record;
pub mod service;
pub mod store;

pub use record::{PersistedSession, ReviewDetails};
pub use service::{ResumeService, SESSION_KEY};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, SessionStoreError};

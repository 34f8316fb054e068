//! Client-side session state.
//!
//! The browser original kept all of this in `localStorage` and mutated it
//! from anywhere. Here the session is an explicit object behind the
//! [`SessionStore`] trait, constructed once and threaded through the
//! workflows, with a file-backed implementation for the CLI and an
//! in-memory one for tests.

pub mod file;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use models::{AuthResponse, RegistrationLink, Role, SavedIntent};

pub use file::JsonSessionStore;
pub use memory::MemorySessionStore;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session io error: {0}")]
    Io(String),
    #[error("session serialization error: {0}")]
    Serialize(String),
}

/// Snapshot of everything the client persists between page loads.
///
/// Absent fields resolve to `None`; taking a snapshot never fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    pub role: Option<Role>,
    pub user_id: Option<i64>,
    pub club_id: Option<String>,
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub saved_event_id: Option<i64>,
    pub saved_link: Option<RegistrationLink>,
    pub current_reg_id: Option<i64>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The pending registration intent, if both halves are present.
    pub fn saved_intent(&self) -> Option<SavedIntent> {
        match (self.saved_event_id, &self.saved_link) {
            (Some(event_id), Some(link)) => Some(SavedIntent { event_id, link: link.clone() }),
            _ => None,
        }
    }
}

/// Persistent key-value session storage.
///
/// At most one pending intent exists at a time: `capture_intent` overwrites
/// any prior unconsumed one. `clear` wipes every field and is idempotent.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Full snapshot; absent fields come back as `None`, never an error.
    async fn snapshot(&self) -> Session;

    async fn is_authenticated(&self) -> bool {
        self.snapshot().await.is_authenticated()
    }

    /// Persist the whole login payload atomically.
    async fn store_login(&self, auth: &AuthResponse) -> Result<(), SessionError>;

    /// Record a registration intent, replacing any prior unconsumed one.
    async fn capture_intent(
        &self,
        event_id: i64,
        link: &RegistrationLink,
    ) -> Result<(), SessionError>;

    async fn saved_intent(&self) -> Option<SavedIntent> {
        self.snapshot().await.saved_intent()
    }

    /// Drop the pending intent once it has been consumed.
    async fn clear_intent(&self) -> Result<(), SessionError>;

    /// Remember the in-progress registration row for the form-submit step.
    async fn store_registration_id(&self, reg_id: i64) -> Result<(), SessionError>;

    async fn registration_id(&self) -> Option<i64> {
        self.snapshot().await.current_reg_id
    }

    async fn clear_registration_id(&self) -> Result<(), SessionError>;

    /// Wipe every stored field. Idempotent; used by logout and on any
    /// expired-token response.
    async fn clear(&self) -> Result<(), SessionError>;
}

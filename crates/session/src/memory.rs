use async_trait::async_trait;
use tokio::sync::RwLock;

use models::{AuthResponse, RegistrationLink};

use crate::{Session, SessionError, SessionStore};

/// In-memory session store for tests and short-lived embedders.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: RwLock<Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self { inner: RwLock::new(session) }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn snapshot(&self) -> Session {
        self.inner.read().await.clone()
    }

    async fn store_login(&self, auth: &AuthResponse) -> Result<(), SessionError> {
        let mut s = self.inner.write().await;
        s.token = Some(auth.token.clone());
        s.role = Some(auth.role);
        s.user_id = Some(auth.user_id);
        s.club_id = auth.club_id.clone();
        s.first_name = Some(auth.first_name.clone());
        s.email = auth.email.clone();
        Ok(())
    }

    async fn capture_intent(
        &self,
        event_id: i64,
        link: &RegistrationLink,
    ) -> Result<(), SessionError> {
        let mut s = self.inner.write().await;
        s.saved_event_id = Some(event_id);
        s.saved_link = Some(link.clone());
        Ok(())
    }

    async fn clear_intent(&self) -> Result<(), SessionError> {
        let mut s = self.inner.write().await;
        s.saved_event_id = None;
        s.saved_link = None;
        Ok(())
    }

    async fn store_registration_id(&self, reg_id: i64) -> Result<(), SessionError> {
        self.inner.write().await.current_reg_id = Some(reg_id);
        Ok(())
    }

    async fn clear_registration_id(&self) -> Result<(), SessionError> {
        self.inner.write().await.current_reg_id = None;
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        *self.inner.write().await = Session::default();
        Ok(())
    }
}

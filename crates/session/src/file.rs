use std::path::PathBuf;

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};
use tracing::warn;

use models::{AuthResponse, RegistrationLink};

use crate::{Session, SessionError, SessionStore};

/// JSON file-backed session store.
///
/// Persists the [`Session`] document on every mutation and reloads it on
/// open, giving the CLI the same lifetime the browser's localStorage gave
/// the original: state survives restarts until an explicit `clear`.
/// A missing or corrupt file starts an empty session instead of failing.
pub struct JsonSessionStore {
    inner: RwLock<Session>,
    file_path: PathBuf,
}

impl JsonSessionStore {
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Self, SessionError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let session = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %file_path.display(), err = %e, "corrupt session file, starting empty");
                Session::default()
            }),
            Err(_) => Session::default(),
        };

        Ok(Self { inner: RwLock::new(session), file_path })
    }

    async fn save(&self) -> Result<(), SessionError> {
        let session = self.inner.read().await;
        let data =
            serde_json::to_vec_pretty(&*session).map_err(|e| SessionError::Serialize(e.to_string()))?;
        drop(session);
        fs::write(&self.file_path, data)
            .await
            .map_err(|e| SessionError::Io(e.to_string()))
    }
}

#[async_trait]
impl SessionStore for JsonSessionStore {
    async fn snapshot(&self) -> Session {
        self.inner.read().await.clone()
    }

    async fn store_login(&self, auth: &AuthResponse) -> Result<(), SessionError> {
        {
            let mut s = self.inner.write().await;
            s.token = Some(auth.token.clone());
            s.role = Some(auth.role);
            s.user_id = Some(auth.user_id);
            s.club_id = auth.club_id.clone();
            s.first_name = Some(auth.first_name.clone());
            s.email = auth.email.clone();
        }
        self.save().await
    }

    async fn capture_intent(
        &self,
        event_id: i64,
        link: &RegistrationLink,
    ) -> Result<(), SessionError> {
        {
            let mut s = self.inner.write().await;
            s.saved_event_id = Some(event_id);
            s.saved_link = Some(link.clone());
        }
        self.save().await
    }

    async fn clear_intent(&self) -> Result<(), SessionError> {
        {
            let mut s = self.inner.write().await;
            s.saved_event_id = None;
            s.saved_link = None;
        }
        self.save().await
    }

    async fn store_registration_id(&self, reg_id: i64) -> Result<(), SessionError> {
        self.inner.write().await.current_reg_id = Some(reg_id);
        self.save().await
    }

    async fn clear_registration_id(&self) -> Result<(), SessionError> {
        self.inner.write().await.current_reg_id = None;
        self.save().await
    }

    async fn clear(&self) -> Result<(), SessionError> {
        *self.inner.write().await = Session::default();
        self.save().await
    }
}

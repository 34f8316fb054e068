use std::sync::Arc;

use chrono::Local;
use tracing::{info, instrument};

use models::{Event, EventDraft, ModelError, Registration, RegistrationStatus};
use session::SessionStore;

use crate::backend::PortalBackend;
use crate::errors::ClientError;
use crate::gateway::ApiResponse;
use crate::Fetched;

/// Faculty dashboard operations: event CRUD scoped to the signed-in
/// official's club, plus submission review.
///
/// Date rules are enforced client-side before any call, matching the
/// original dashboard's validation.
pub struct FacultyApi {
    store: Arc<dyn SessionStore>,
    backend: Arc<dyn PortalBackend>,
}

impl FacultyApi {
    pub fn new(store: Arc<dyn SessionStore>, backend: Arc<dyn PortalBackend>) -> Self {
        Self { store, backend }
    }

    async fn credentials(&self) -> Result<Option<(String, String)>, ClientError> {
        let session = self.store.snapshot().await;
        let Some(token) = session.token else {
            self.store.clear().await?;
            return Ok(None);
        };
        let club_id = session.club_id.ok_or_else(|| {
            ClientError::Model(ModelError::Validation("no club assigned to this account".into()))
        })?;
        Ok(Some((token, club_id)))
    }

    async fn settle<T>(&self, resp: ApiResponse<T>) -> Result<Fetched<T>, ClientError> {
        match resp {
            ApiResponse::AuthExpired => {
                self.store.clear().await?;
                Ok(Fetched::SessionExpired)
            }
            ApiResponse::Ok(value) => Ok(Fetched::Ok(value)),
        }
    }

    #[instrument(skip(self))]
    pub async fn my_events(&self) -> Result<Fetched<Vec<Event>>, ClientError> {
        let Some((token, _)) = self.credentials().await? else {
            return Ok(Fetched::SessionExpired);
        };
        let resp = self.backend.my_events(&token).await?;
        self.settle(resp).await
    }

    #[instrument(skip(self, draft), fields(event_name = %draft.event_name))]
    pub async fn add_event(&self, draft: &EventDraft) -> Result<Fetched<()>, ClientError> {
        draft.validate(Local::now().date_naive())?;
        let Some((token, club_id)) = self.credentials().await? else {
            return Ok(Fetched::SessionExpired);
        };
        let mut draft = draft.clone();
        draft.club_id = club_id;
        draft.registration_form_link = draft.normalized_link();
        let resp = self.backend.add_event(&token, &draft).await?;
        info!("event submitted");
        self.settle(resp).await
    }

    #[instrument(skip(self))]
    pub async fn find_event(&self, event_name: &str) -> Result<Fetched<Event>, ClientError> {
        let Some((token, club_id)) = self.credentials().await? else {
            return Ok(Fetched::SessionExpired);
        };
        let resp = self.backend.event_details(&token, &club_id, event_name).await?;
        self.settle(resp).await
    }

    #[instrument(skip(self, draft))]
    pub async fn update_event(
        &self,
        event_id: i64,
        draft: &EventDraft,
    ) -> Result<Fetched<()>, ClientError> {
        draft.validate(Local::now().date_naive())?;
        let Some((token, club_id)) = self.credentials().await? else {
            return Ok(Fetched::SessionExpired);
        };
        let mut draft = draft.clone();
        draft.club_id = club_id;
        let resp = self.backend.update_event(&token, event_id, &draft).await?;
        self.settle(resp).await
    }

    #[instrument(skip(self))]
    pub async fn delete_event(&self, event_id: i64) -> Result<Fetched<()>, ClientError> {
        let Some((token, _)) = self.credentials().await? else {
            return Ok(Fetched::SessionExpired);
        };
        let resp = self.backend.delete_event(&token, event_id).await?;
        self.settle(resp).await
    }

    #[instrument(skip(self))]
    pub async fn submissions(&self) -> Result<Fetched<Vec<Registration>>, ClientError> {
        let Some((token, club_id)) = self.credentials().await? else {
            return Ok(Fetched::SessionExpired);
        };
        let resp = self.backend.submissions(&token, &club_id).await?;
        self.settle(resp).await
    }

    #[instrument(skip(self))]
    pub async fn approve(&self, reg_id: i64) -> Result<Fetched<()>, ClientError> {
        self.set_status(reg_id, RegistrationStatus::Approved).await
    }

    #[instrument(skip(self))]
    pub async fn reject(&self, reg_id: i64) -> Result<Fetched<()>, ClientError> {
        self.set_status(reg_id, RegistrationStatus::Rejected).await
    }

    pub async fn set_status(
        &self,
        reg_id: i64,
        status: RegistrationStatus,
    ) -> Result<Fetched<()>, ClientError> {
        let Some((token, _)) = self.credentials().await? else {
            return Ok(Fetched::SessionExpired);
        };
        let resp = self.backend.update_status(&token, reg_id, status).await?;
        info!(reg_id, status = status.as_str(), "registration status updated");
        self.settle(resp).await
    }
}

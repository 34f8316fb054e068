use std::sync::Arc;

use tracing::instrument;

use models::Registration;
use session::SessionStore;

use crate::backend::PortalBackend;
use crate::errors::ClientError;
use crate::gateway::ApiResponse;
use crate::Fetched;

/// Read side of the student dashboard.
pub struct StudentApi {
    store: Arc<dyn SessionStore>,
    backend: Arc<dyn PortalBackend>,
}

impl StudentApi {
    pub fn new(store: Arc<dyn SessionStore>, backend: Arc<dyn PortalBackend>) -> Self {
        Self { store, backend }
    }

    /// All registrations for the signed-in user. Any expired-token answer
    /// wipes the session before reporting it.
    #[instrument(skip(self))]
    pub async fn my_registrations(&self) -> Result<Fetched<Vec<Registration>>, ClientError> {
        let session = self.store.snapshot().await;
        let (Some(token), Some(user_id)) = (session.token.as_deref(), session.user_id) else {
            self.store.clear().await?;
            return Ok(Fetched::SessionExpired);
        };
        match self.backend.my_registrations(token, user_id).await? {
            ApiResponse::AuthExpired => {
                self.store.clear().await?;
                Ok(Fetched::SessionExpired)
            }
            ApiResponse::Ok(regs) => Ok(Fetched::Ok(regs)),
        }
    }
}

/// Detail lines for one registration, as the "View Details" popup shows
/// them: one line per form field in insertion order, or a fallback note
/// for external-link registrations that carry no form payload.
pub fn submission_lines(reg: &Registration) -> Vec<String> {
    match reg.parsed_form() {
        Ok(Some(form)) => form.iter().map(|(name, value)| format!("{name}: {value}")).collect(),
        Ok(None) => vec!["External registration; no additional form data available.".to_string()],
        Err(_) => vec!["Error parsing form data.".to_string()],
    }
}

use std::sync::Arc;

use tracing::{info, instrument, warn};

use models::{FormData, FormDataUpdate, NewRegistration, RegistrationLink};
use session::SessionStore;

use crate::backend::PortalBackend;
use crate::errors::ClientError;
use crate::gateway::ApiResponse;

/// Prompt shown before handing the user to a third-party registration page.
pub const EXTERNAL_CONFIRM_PROMPT: &str =
    "Are you sure you want to register? Type 'confirm' to proceed:";

/// Synchronous consent gate shown before an external-site handoff.
///
/// The browser original used a blocking `prompt()`; the CLI reads stdin and
/// tests plug in constant gates.
pub trait ConsentGate: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Constant gates for tests and doc examples.
pub mod gates {
    use super::ConsentGate;

    pub struct AcceptAll;
    impl ConsentGate for AcceptAll {
        fn confirm(&self, _prompt: &str) -> bool {
            true
        }
    }

    pub struct DeclineAll;
    impl ConsentGate for DeclineAll {
        fn confirm(&self, _prompt: &str) -> bool {
            false
        }
    }
}

/// What the intent-recovery run decided; the caller navigates accordingly.
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryOutcome {
    /// No pending intent (or no signed-in user to attribute it to).
    DidNotAct,
    /// Intent is stored but the user must authenticate first.
    RedirectToLogin,
    /// User declined the external-site confirmation; intent left untouched.
    Declined,
    /// Registration row created; continue to the internal club form.
    InternalForm { reg_id: i64 },
    /// Registration row created; open the external page in a new context
    /// and land the current view on the student dashboard.
    ExternalHandoff { link: String },
    /// The backend rejected the token mid-flow; the session has been wiped.
    SessionExpired,
}

impl RecoveryOutcome {
    /// Whether recovery consumed the intent and decided navigation itself.
    /// Login falls back to the role-based dashboard only when this is false.
    pub fn acted(&self) -> bool {
        matches!(
            self,
            RecoveryOutcome::InternalForm { .. }
                | RecoveryOutcome::ExternalHandoff { .. }
                | RecoveryOutcome::SessionExpired
        )
    }
}

/// Result of submitting the internal club form.
#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome {
    /// Payload attached; the in-progress registration id has been cleared.
    Submitted,
    /// No in-progress registration id in the session; nothing was sent.
    MissingRegistration,
    /// The backend rejected the token; the session has been wiped.
    SessionExpired,
}

/// The registration workflow: capture a user's intent to register, persist
/// it across a login round-trip, and replay it against the backend.
///
/// Ordering guarantees: the registration row is created (or confirmed
/// failed) before the intent keys are cleared, so a crash between the two
/// steps never loses the pending reference. Failures leave all stored
/// state intact for a retry.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use client::backend::mock::MockBackend;
/// use client::workflow::{gates::AcceptAll, RecoveryOutcome, RegistrationWorkflow};
/// use models::RegistrationLink;
/// use session::MemorySessionStore;
///
/// let store = Arc::new(MemorySessionStore::new());
/// let backend = Arc::new(MockBackend::new());
/// let workflow = RegistrationWorkflow::new(store, backend, Arc::new(AcceptAll));
/// // Not signed in yet: the intent is captured and the user is sent to login.
/// let outcome = tokio_test::block_on(
///     workflow.handle_register_click(42, &RegistrationLink::InternalForm),
/// )
/// .unwrap();
/// assert_eq!(outcome, RecoveryOutcome::RedirectToLogin);
/// ```
pub struct RegistrationWorkflow {
    store: Arc<dyn SessionStore>,
    backend: Arc<dyn PortalBackend>,
    gate: Arc<dyn ConsentGate>,
}

impl RegistrationWorkflow {
    pub fn new(
        store: Arc<dyn SessionStore>,
        backend: Arc<dyn PortalBackend>,
        gate: Arc<dyn ConsentGate>,
    ) -> Self {
        Self { store, backend, gate }
    }

    /// A dashboard "Register" action. The intent is captured before the
    /// auth check so it survives the login round-trip; if no token is
    /// present the user is sent to login without any network traffic.
    #[instrument(skip(self, link))]
    pub async fn handle_register_click(
        &self,
        event_id: i64,
        link: &RegistrationLink,
    ) -> Result<RecoveryOutcome, ClientError> {
        self.store.capture_intent(event_id, link).await?;
        if !self.store.is_authenticated().await {
            info!(event_id, "intent captured; login required before registering");
            return Ok(RecoveryOutcome::RedirectToLogin);
        }
        self.recover().await
    }

    /// Replay any pending intent. Re-invoking with nothing stored is a
    /// no-op: `DidNotAct`, no network calls.
    #[instrument(skip(self))]
    pub async fn recover(&self) -> Result<RecoveryOutcome, ClientError> {
        let session = self.store.snapshot().await;
        let Some(intent) = session.saved_intent() else {
            return Ok(RecoveryOutcome::DidNotAct);
        };
        let Some(user_id) = session.user_id else {
            return Ok(RecoveryOutcome::DidNotAct);
        };
        let Some(token) = session.token.as_deref() else {
            return Ok(RecoveryOutcome::RedirectToLogin);
        };

        let new_reg = NewRegistration { event_id: intent.event_id, user_id };
        match intent.link {
            RegistrationLink::InternalForm => {
                match self.backend.create_registration(token, &new_reg).await? {
                    ApiResponse::AuthExpired => self.expire_session().await,
                    ApiResponse::Ok(reg) => {
                        // Creation succeeded; only now is the intent consumed.
                        self.store.store_registration_id(reg.reg_id).await?;
                        self.store.clear_intent().await?;
                        info!(reg_id = reg.reg_id, event_id = intent.event_id, "registration created");
                        Ok(RecoveryOutcome::InternalForm { reg_id: reg.reg_id })
                    }
                }
            }
            RegistrationLink::External(link) => {
                if !self.gate.confirm(EXTERNAL_CONFIRM_PROMPT) {
                    info!(event_id = intent.event_id, "external registration declined");
                    return Ok(RecoveryOutcome::Declined);
                }
                match self.backend.create_registration(token, &new_reg).await? {
                    ApiResponse::AuthExpired => self.expire_session().await,
                    ApiResponse::Ok(_) => {
                        self.store.clear_intent().await?;
                        info!(event_id = intent.event_id, "external registration recorded");
                        Ok(RecoveryOutcome::ExternalHandoff { link })
                    }
                }
            }
        }
    }

    /// Attach the collected form fields to the in-progress registration.
    /// On failure every stored key stays put so the user can retry.
    #[instrument(skip(self, form))]
    pub async fn submit_form(&self, form: &FormData) -> Result<FormOutcome, ClientError> {
        let session = self.store.snapshot().await;
        let Some(reg_id) = session.current_reg_id else {
            warn!("form submitted without an in-progress registration id");
            return Ok(FormOutcome::MissingRegistration);
        };
        let Some(token) = session.token.as_deref() else {
            self.store.clear().await?;
            return Ok(FormOutcome::SessionExpired);
        };

        let update = FormDataUpdate { reg_id, form_data: form.to_json()? };
        match self.backend.update_form_data(token, &update).await? {
            ApiResponse::AuthExpired => {
                self.store.clear().await?;
                Ok(FormOutcome::SessionExpired)
            }
            ApiResponse::Ok(()) => {
                self.store.clear_registration_id().await?;
                info!(reg_id, "form data attached; registration complete");
                Ok(FormOutcome::Submitted)
            }
        }
    }

    async fn expire_session(&self) -> Result<RecoveryOutcome, ClientError> {
        self.store.clear().await?;
        Ok(RecoveryOutcome::SessionExpired)
    }
}

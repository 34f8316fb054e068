use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument, warn};

use models::{AuthResponse, Destination, LoginRequest};
use session::SessionStore;

use crate::backend::PortalBackend;
use crate::errors::ClientError;
use crate::workflow::{RecoveryOutcome, RegistrationWorkflow};

/// Client-side login policy. An empty allow-list disables the domain check.
#[derive(Debug, Clone, Default)]
pub struct LoginPolicy {
    pub allowed_email_domains: Vec<String>,
}

impl LoginPolicy {
    pub fn new(allowed_email_domains: Vec<String>) -> Self {
        Self { allowed_email_domains }
    }

    pub fn allows(&self, email: &str) -> bool {
        if self.allowed_email_domains.is_empty() {
            return true;
        }
        let email = email.to_lowercase();
        self.allowed_email_domains.iter().any(|d| email.ends_with(&d.to_lowercase()))
    }
}

/// Login failures with user-facing messages.
///
/// The backend reports business failures as free text, so the only
/// discrimination available is substring matching on known phrases;
/// anything unrecognized falls back to `Rejected` with the raw message.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("this email domain is not allowed; use your campus address")]
    DomainNotAllowed,
    #[error("this email is not registered; please sign up first")]
    NotRegistered,
    #[error("incorrect password")]
    IncorrectPassword,
    #[error("login failed: {0}")]
    Rejected(String),
    #[error(transparent)]
    Client(ClientError),
}

impl LoginError {
    fn classify(err: ClientError) -> Self {
        match err {
            ClientError::Api { message, .. } => {
                if message.contains("not registered") {
                    LoginError::NotRegistered
                } else if message.contains("Incorrect password") {
                    LoginError::IncorrectPassword
                } else if message.contains("emails are allowed") {
                    LoginError::DomainNotAllowed
                } else if message.is_empty() {
                    LoginError::Rejected("something went wrong, please try again".into())
                } else {
                    LoginError::Rejected(message)
                }
            }
            other => LoginError::Client(other),
        }
    }
}

/// Result of a successful login: the persisted identity, what intent
/// recovery did (if anything), and where to go next.
#[derive(Debug)]
pub struct LoginOutcome {
    pub auth: AuthResponse,
    pub recovery: RecoveryOutcome,
    pub destination: Destination,
}

/// Validates credentials, persists the session, then defers to intent
/// recovery before falling back to the role-based dashboard.
pub struct LoginFlow {
    store: Arc<dyn SessionStore>,
    backend: Arc<dyn PortalBackend>,
    policy: LoginPolicy,
}

impl LoginFlow {
    pub fn new(
        store: Arc<dyn SessionStore>,
        backend: Arc<dyn PortalBackend>,
        policy: LoginPolicy,
    ) -> Self {
        Self { store, backend, policy }
    }

    #[instrument(skip(self, password, workflow))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        workflow: &RegistrationWorkflow,
    ) -> Result<LoginOutcome, LoginError> {
        // Domain policy runs before any network traffic.
        if !self.policy.allows(email) {
            warn!("email rejected by domain policy");
            return Err(LoginError::DomainNotAllowed);
        }

        let request = LoginRequest { email: email.to_string(), password: password.to_string() };
        let auth = match self.backend.login(&request).await {
            Ok(auth) => auth,
            Err(e) => return Err(LoginError::classify(e)),
        };

        self.store.store_login(&auth).await.map_err(|e| LoginError::Client(e.into()))?;
        info!(user_id = auth.user_id, role = auth.role.as_str(), "login succeeded");

        // Replay any registration intent captured before login; only fall
        // back to the role dashboard when recovery did not act.
        let recovery = if self.store.saved_intent().await.is_some() {
            workflow.recover().await.map_err(LoginError::Client)?
        } else {
            RecoveryOutcome::DidNotAct
        };

        let destination = match &recovery {
            RecoveryOutcome::InternalForm { .. } => Destination::ClubForm,
            RecoveryOutcome::ExternalHandoff { .. } => Destination::StudentDashboard,
            RecoveryOutcome::SessionExpired | RecoveryOutcome::RedirectToLogin => Destination::Login,
            RecoveryOutcome::DidNotAct | RecoveryOutcome::Declined => {
                Destination::for_role(auth.role)
            }
        };

        Ok(LoginOutcome { auth, recovery, destination })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_matches_domain_suffixes_case_insensitively() {
        let policy = LoginPolicy::new(vec!["@banasthali.in".into(), "@gmail.com".into()]);
        assert!(policy.allows("asha@GMAIL.com"));
        assert!(policy.allows("ravi@banasthali.in"));
        assert!(!policy.allows("someone@outlook.com"));
    }

    #[test]
    fn empty_policy_allows_everything() {
        assert!(LoginPolicy::default().allows("anyone@anywhere.example"));
    }

    #[test]
    fn classifies_backend_error_text() {
        let err = LoginError::classify(ClientError::Api {
            status: 401,
            message: "Error: Email not registered. Please sign up first!".into(),
        });
        assert!(matches!(err, LoginError::NotRegistered));

        let err = LoginError::classify(ClientError::Api {
            status: 401,
            message: "Error: Incorrect password!".into(),
        });
        assert!(matches!(err, LoginError::IncorrectPassword));

        let err = LoginError::classify(ClientError::Api {
            status: 400,
            message: "Error: Only @banasthali.in or @gmail.com emails are allowed!".into(),
        });
        assert!(matches!(err, LoginError::DomainNotAllowed));

        let err = LoginError::classify(ClientError::Api {
            status: 500,
            message: "database exploded".into(),
        });
        assert!(matches!(err, LoginError::Rejected(_)));

        let err = LoginError::classify(ClientError::Transport("timed out".into()));
        assert!(matches!(err, LoginError::Client(_)));
    }
}

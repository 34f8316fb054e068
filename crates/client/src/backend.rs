use async_trait::async_trait;

use models::{
    AuthResponse, Event, EventDraft, FormDataUpdate, LoginRequest, NewRegistration, Registration,
    RegistrationStatus,
};

use crate::errors::ClientError;
use crate::gateway::{encode_segment, ApiResponse, Gateway};

/// The portal's HTTP contract, abstracted so workflows can run against an
/// in-memory double in tests.
#[async_trait]
pub trait PortalBackend: Send + Sync {
    /// POST /auth/login (unauthenticated).
    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ClientError>;

    /// POST /student/register: creates the registration row and returns
    /// it, including the generated id.
    async fn create_registration(
        &self,
        token: &str,
        req: &NewRegistration,
    ) -> Result<ApiResponse<Registration>, ClientError>;

    /// PUT /student/update-form-data: attaches the serialized form payload.
    async fn update_form_data(
        &self,
        token: &str,
        update: &FormDataUpdate,
    ) -> Result<ApiResponse<()>, ClientError>;

    /// GET /student/my-registrations/{userId}.
    async fn my_registrations(
        &self,
        token: &str,
        user_id: i64,
    ) -> Result<ApiResponse<Vec<Registration>>, ClientError>;

    /// GET /faculty/my-events (scoped by the token's club).
    async fn my_events(&self, token: &str) -> Result<ApiResponse<Vec<Event>>, ClientError>;

    /// POST /faculty/add-event.
    async fn add_event(
        &self,
        token: &str,
        draft: &EventDraft,
    ) -> Result<ApiResponse<()>, ClientError>;

    /// GET /faculty/event-details/{clubId}/{eventName}.
    async fn event_details(
        &self,
        token: &str,
        club_id: &str,
        event_name: &str,
    ) -> Result<ApiResponse<Event>, ClientError>;

    /// PUT /faculty/update-event/{eventId}.
    async fn update_event(
        &self,
        token: &str,
        event_id: i64,
        draft: &EventDraft,
    ) -> Result<ApiResponse<()>, ClientError>;

    /// DELETE /faculty/delete-event/{eventId}.
    async fn delete_event(&self, token: &str, event_id: i64)
        -> Result<ApiResponse<()>, ClientError>;

    /// GET /faculty/submissions/{clubId}.
    async fn submissions(
        &self,
        token: &str,
        club_id: &str,
    ) -> Result<ApiResponse<Vec<Registration>>, ClientError>;

    /// PUT /faculty/update-status/{regId}?status=....
    async fn update_status(
        &self,
        token: &str,
        reg_id: i64,
        status: RegistrationStatus,
    ) -> Result<ApiResponse<()>, ClientError>;
}

/// Live implementation over the [`Gateway`].
pub struct HttpBackend {
    gateway: Gateway,
}

impl HttpBackend {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl PortalBackend for HttpBackend {
    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ClientError> {
        self.gateway.post_public("/auth/login", req).await
    }

    async fn create_registration(
        &self,
        token: &str,
        req: &NewRegistration,
    ) -> Result<ApiResponse<Registration>, ClientError> {
        self.gateway.post_json("/student/register", Some(token), req).await
    }

    async fn update_form_data(
        &self,
        token: &str,
        update: &FormDataUpdate,
    ) -> Result<ApiResponse<()>, ClientError> {
        self.gateway
            .put_json_status("/student/update-form-data", Some(token), update)
            .await
    }

    async fn my_registrations(
        &self,
        token: &str,
        user_id: i64,
    ) -> Result<ApiResponse<Vec<Registration>>, ClientError> {
        self.gateway
            .get_json(&format!("/student/my-registrations/{user_id}"), Some(token))
            .await
    }

    async fn my_events(&self, token: &str) -> Result<ApiResponse<Vec<Event>>, ClientError> {
        self.gateway.get_json("/faculty/my-events", Some(token)).await
    }

    async fn add_event(
        &self,
        token: &str,
        draft: &EventDraft,
    ) -> Result<ApiResponse<()>, ClientError> {
        self.gateway.post_json_status("/faculty/add-event", Some(token), draft).await
    }

    async fn event_details(
        &self,
        token: &str,
        club_id: &str,
        event_name: &str,
    ) -> Result<ApiResponse<Event>, ClientError> {
        let path = format!(
            "/faculty/event-details/{}/{}",
            encode_segment(club_id),
            encode_segment(event_name)
        );
        self.gateway.get_json(&path, Some(token)).await
    }

    async fn update_event(
        &self,
        token: &str,
        event_id: i64,
        draft: &EventDraft,
    ) -> Result<ApiResponse<()>, ClientError> {
        self.gateway
            .put_json_status(&format!("/faculty/update-event/{event_id}"), Some(token), draft)
            .await
    }

    async fn delete_event(
        &self,
        token: &str,
        event_id: i64,
    ) -> Result<ApiResponse<()>, ClientError> {
        self.gateway.delete(&format!("/faculty/delete-event/{event_id}"), Some(token)).await
    }

    async fn submissions(
        &self,
        token: &str,
        club_id: &str,
    ) -> Result<ApiResponse<Vec<Registration>>, ClientError> {
        self.gateway
            .get_json(&format!("/faculty/submissions/{}", encode_segment(club_id)), Some(token))
            .await
    }

    async fn update_status(
        &self,
        token: &str,
        reg_id: i64,
        status: RegistrationStatus,
    ) -> Result<ApiResponse<()>, ClientError> {
        self.gateway
            .put_empty(
                &format!("/faculty/update-status/{reg_id}?status={}", status.as_str()),
                Some(token),
            )
            .await
    }
}

/// In-memory stand-in for the portal backend.
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockState {
        calls: u32,
        users: Vec<(String, String, AuthResponse)>,
        registrations: Vec<Registration>,
        events: Vec<Event>,
        next_reg_id: i64,
        next_event_id: i64,
        expire_tokens: bool,
        fail_form_updates: bool,
    }

    /// Scriptable backend double. Counts every call so tests can assert
    /// the zero-network-call properties, and can be switched to answer
    /// every authenticated request with an expired-token outcome.
    #[derive(Default)]
    pub struct MockBackend {
        state: Mutex<MockState>,
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Register a known account the mock login will accept.
        pub fn with_user(self, email: &str, password: &str, auth: AuthResponse) -> Self {
            self.state.lock().unwrap().users.push((email.into(), password.into(), auth));
            self
        }

        /// Every subsequent authenticated call reports an expired token.
        pub fn expire_all_tokens(&self) {
            self.state.lock().unwrap().expire_tokens = true;
        }

        /// Every subsequent form update fails server-side.
        pub fn fail_form_updates(&self) {
            self.state.lock().unwrap().fail_form_updates = true;
        }

        pub fn call_count(&self) -> u32 {
            self.state.lock().unwrap().calls
        }

        pub fn registration_count(&self) -> usize {
            self.state.lock().unwrap().registrations.len()
        }

        pub fn registration(&self, reg_id: i64) -> Option<Registration> {
            self.state
                .lock()
                .unwrap()
                .registrations
                .iter()
                .find(|r| r.reg_id == reg_id)
                .cloned()
        }
    }

    #[async_trait]
    impl PortalBackend for MockBackend {
        async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ClientError> {
            let mut state = self.state.lock().unwrap();
            state.calls += 1;
            let Some((_, password, auth)) =
                state.users.iter().find(|(email, _, _)| *email == req.email)
            else {
                return Err(ClientError::Api {
                    status: 401,
                    message: "Error: Email not registered. Please sign up first!".into(),
                });
            };
            if *password != req.password {
                return Err(ClientError::Api {
                    status: 401,
                    message: "Error: Incorrect password!".into(),
                });
            }
            Ok(auth.clone())
        }

        async fn create_registration(
            &self,
            _token: &str,
            req: &NewRegistration,
        ) -> Result<ApiResponse<Registration>, ClientError> {
            let mut state = self.state.lock().unwrap();
            state.calls += 1;
            if state.expire_tokens {
                return Ok(ApiResponse::AuthExpired);
            }
            if state
                .registrations
                .iter()
                .any(|r| r.user_id == req.user_id && r.event_id == req.event_id)
            {
                return Err(ClientError::Api {
                    status: 400,
                    message: "You have already registered for this event!".into(),
                });
            }
            state.next_reg_id += 1;
            let reg = Registration {
                reg_id: state.next_reg_id,
                event_id: req.event_id,
                user_id: req.user_id,
                status: RegistrationStatus::Applied,
                submission_date: Some(Utc::now().naive_utc()),
                form_data: None,
            };
            state.registrations.push(reg.clone());
            Ok(ApiResponse::Ok(reg))
        }

        async fn update_form_data(
            &self,
            _token: &str,
            update: &FormDataUpdate,
        ) -> Result<ApiResponse<()>, ClientError> {
            let mut state = self.state.lock().unwrap();
            state.calls += 1;
            if state.expire_tokens {
                return Ok(ApiResponse::AuthExpired);
            }
            if state.fail_form_updates {
                return Err(ClientError::Api {
                    status: 500,
                    message: "Failed to save form data.".into(),
                });
            }
            match state.registrations.iter_mut().find(|r| r.reg_id == update.reg_id) {
                Some(reg) => {
                    reg.form_data = Some(update.form_data.clone());
                    Ok(ApiResponse::Ok(()))
                }
                None => Err(ClientError::Api { status: 404, message: "Registration not found".into() }),
            }
        }

        async fn my_registrations(
            &self,
            _token: &str,
            user_id: i64,
        ) -> Result<ApiResponse<Vec<Registration>>, ClientError> {
            let mut state = self.state.lock().unwrap();
            state.calls += 1;
            if state.expire_tokens {
                return Ok(ApiResponse::AuthExpired);
            }
            Ok(ApiResponse::Ok(
                state.registrations.iter().filter(|r| r.user_id == user_id).cloned().collect(),
            ))
        }

        async fn my_events(&self, _token: &str) -> Result<ApiResponse<Vec<Event>>, ClientError> {
            let mut state = self.state.lock().unwrap();
            state.calls += 1;
            if state.expire_tokens {
                return Ok(ApiResponse::AuthExpired);
            }
            Ok(ApiResponse::Ok(state.events.clone()))
        }

        async fn add_event(
            &self,
            _token: &str,
            draft: &EventDraft,
        ) -> Result<ApiResponse<()>, ClientError> {
            let mut state = self.state.lock().unwrap();
            state.calls += 1;
            if state.expire_tokens {
                return Ok(ApiResponse::AuthExpired);
            }
            state.next_event_id += 1;
            let event = Event {
                event_id: state.next_event_id,
                club_id: draft.club_id.clone(),
                venue_id: draft.venue_id.clone(),
                event_name: draft.event_name.clone(),
                description: Some(draft.description.clone()),
                event_date: draft.event_date,
                event_time: draft.event_time,
                deadline: draft.deadline,
                registration_form_link: draft.normalized_link(),
            };
            state.events.push(event);
            Ok(ApiResponse::Ok(()))
        }

        async fn event_details(
            &self,
            _token: &str,
            club_id: &str,
            event_name: &str,
        ) -> Result<ApiResponse<Event>, ClientError> {
            let mut state = self.state.lock().unwrap();
            state.calls += 1;
            if state.expire_tokens {
                return Ok(ApiResponse::AuthExpired);
            }
            match state
                .events
                .iter()
                .find(|e| e.club_id == club_id && e.event_name == event_name)
            {
                Some(event) => Ok(ApiResponse::Ok(event.clone())),
                None => Err(ClientError::Api { status: 404, message: "Event not found".into() }),
            }
        }

        async fn update_event(
            &self,
            _token: &str,
            event_id: i64,
            draft: &EventDraft,
        ) -> Result<ApiResponse<()>, ClientError> {
            let mut state = self.state.lock().unwrap();
            state.calls += 1;
            if state.expire_tokens {
                return Ok(ApiResponse::AuthExpired);
            }
            match state.events.iter_mut().find(|e| e.event_id == event_id) {
                Some(event) => {
                    event.event_name = draft.event_name.clone();
                    event.description = Some(draft.description.clone());
                    event.venue_id = draft.venue_id.clone();
                    event.event_date = draft.event_date;
                    event.event_time = draft.event_time;
                    event.deadline = draft.deadline;
                    event.registration_form_link = draft.registration_form_link.clone();
                    Ok(ApiResponse::Ok(()))
                }
                None => Err(ClientError::Api { status: 404, message: "Event not found".into() }),
            }
        }

        async fn delete_event(
            &self,
            _token: &str,
            event_id: i64,
        ) -> Result<ApiResponse<()>, ClientError> {
            let mut state = self.state.lock().unwrap();
            state.calls += 1;
            if state.expire_tokens {
                return Ok(ApiResponse::AuthExpired);
            }
            let before = state.events.len();
            state.events.retain(|e| e.event_id != event_id);
            if state.events.len() == before {
                return Err(ClientError::Api { status: 404, message: "Event not found".into() });
            }
            Ok(ApiResponse::Ok(()))
        }

        async fn submissions(
            &self,
            _token: &str,
            club_id: &str,
        ) -> Result<ApiResponse<Vec<Registration>>, ClientError> {
            let mut state = self.state.lock().unwrap();
            state.calls += 1;
            if state.expire_tokens {
                return Ok(ApiResponse::AuthExpired);
            }
            let club_events: Vec<i64> = state
                .events
                .iter()
                .filter(|e| e.club_id == club_id)
                .map(|e| e.event_id)
                .collect();
            Ok(ApiResponse::Ok(
                state
                    .registrations
                    .iter()
                    .filter(|r| club_events.contains(&r.event_id))
                    .cloned()
                    .collect(),
            ))
        }

        async fn update_status(
            &self,
            _token: &str,
            reg_id: i64,
            status: RegistrationStatus,
        ) -> Result<ApiResponse<()>, ClientError> {
            let mut state = self.state.lock().unwrap();
            state.calls += 1;
            if state.expire_tokens {
                return Ok(ApiResponse::AuthExpired);
            }
            match state.registrations.iter_mut().find(|r| r.reg_id == reg_id) {
                Some(reg) => {
                    reg.status = status;
                    Ok(ApiResponse::Ok(()))
                }
                None => Err(ClientError::Api { status: 404, message: "Registration not found".into() }),
            }
        }
    }
}

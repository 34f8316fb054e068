use std::sync::Arc;

use client::backend::mock::MockBackend;
use client::faculty::FacultyApi;
use client::login::{LoginError, LoginFlow, LoginPolicy};
use client::student::StudentApi;
use client::workflow::{
    gates::{AcceptAll, DeclineAll},
    ConsentGate, FormOutcome, RecoveryOutcome, RegistrationWorkflow,
};
use client::Fetched;
use models::{AuthResponse, Destination, FormData, RegistrationLink, Role};
use session::{MemorySessionStore, Session, SessionStore};

fn student_auth() -> AuthResponse {
    AuthResponse {
        token: "tok-student".into(),
        role: Role::Student,
        user_id: 7,
        club_id: None,
        first_name: "Asha".into(),
        email: Some("asha@gmail.com".into()),
    }
}

fn faculty_auth() -> AuthResponse {
    AuthResponse {
        token: "tok-faculty".into(),
        role: Role::Faculty,
        user_id: 3,
        club_id: Some("C01".into()),
        first_name: "Ravi".into(),
        email: None,
    }
}

fn workflow(
    store: &Arc<MemorySessionStore>,
    backend: &Arc<MockBackend>,
    gate: Arc<dyn ConsentGate>,
) -> RegistrationWorkflow {
    RegistrationWorkflow::new(store.clone(), backend.clone(), gate)
}

#[tokio::test]
async fn unauthenticated_click_captures_intent_and_redirects_without_network() {
    let store = Arc::new(MemorySessionStore::new());
    let backend = Arc::new(MockBackend::new());
    let wf = workflow(&store, &backend, Arc::new(AcceptAll));

    let outcome = wf
        .handle_register_click(42, &RegistrationLink::InternalForm)
        .await
        .unwrap();

    assert_eq!(outcome, RecoveryOutcome::RedirectToLogin);
    assert_eq!(backend.call_count(), 0);
    let intent = store.saved_intent().await.unwrap();
    assert_eq!(intent.event_id, 42);
    assert_eq!(intent.link, RegistrationLink::InternalForm);
}

#[tokio::test]
async fn declined_external_consent_leaves_intent_and_makes_no_call() {
    let store = Arc::new(MemorySessionStore::new());
    let backend = Arc::new(MockBackend::new());
    store.store_login(&student_auth()).await.unwrap();
    let link = RegistrationLink::External("https://forms.example.com/ext".into());
    let wf = workflow(&store, &backend, Arc::new(DeclineAll));

    let outcome = wf.handle_register_click(42, &link).await.unwrap();

    assert_eq!(outcome, RecoveryOutcome::Declined);
    assert_eq!(backend.call_count(), 0);
    let intent = store.saved_intent().await.unwrap();
    assert_eq!(intent.event_id, 42);
    assert_eq!(intent.link, link);
}

#[tokio::test]
async fn accepted_external_consent_registers_and_hands_off() {
    let store = Arc::new(MemorySessionStore::new());
    let backend = Arc::new(MockBackend::new());
    store.store_login(&student_auth()).await.unwrap();
    let link = RegistrationLink::External("https://forms.example.com/ext".into());
    let wf = workflow(&store, &backend, Arc::new(AcceptAll));

    let outcome = wf.handle_register_click(42, &link).await.unwrap();

    assert_eq!(
        outcome,
        RecoveryOutcome::ExternalHandoff { link: "https://forms.example.com/ext".into() }
    );
    assert_eq!(backend.registration_count(), 1);
    assert!(store.saved_intent().await.is_none());
}

#[tokio::test]
async fn internal_form_flow_leaves_no_intent_keys_behind() {
    let store = Arc::new(MemorySessionStore::new());
    let backend = Arc::new(MockBackend::new());
    store.store_login(&student_auth()).await.unwrap();
    let wf = workflow(&store, &backend, Arc::new(AcceptAll));

    let outcome = wf
        .handle_register_click(42, &RegistrationLink::InternalForm)
        .await
        .unwrap();
    let RecoveryOutcome::InternalForm { reg_id } = outcome else {
        panic!("expected internal-form outcome, got {outcome:?}");
    };
    assert_eq!(store.registration_id().await, Some(reg_id));

    let mut form = FormData::new();
    form.insert("Name", "Asha");
    form.insert("Age", "20");
    let submitted = wf.submit_form(&form).await.unwrap();
    assert_eq!(submitted, FormOutcome::Submitted);

    // No leftover intent state after a full registration.
    let snapshot = store.snapshot().await;
    assert!(snapshot.saved_event_id.is_none());
    assert!(snapshot.saved_link.is_none());
    assert!(snapshot.current_reg_id.is_none());

    let stored = backend.registration(reg_id).unwrap();
    assert_eq!(stored.form_data.as_deref(), Some(r#"{"Name":"Asha","Age":"20"}"#));
}

#[tokio::test]
async fn recovery_without_intent_is_an_idempotent_no_op() {
    let store = Arc::new(MemorySessionStore::new());
    let backend = Arc::new(MockBackend::new());
    store.store_login(&student_auth()).await.unwrap();
    let wf = workflow(&store, &backend, Arc::new(AcceptAll));

    assert_eq!(wf.recover().await.unwrap(), RecoveryOutcome::DidNotAct);
    assert_eq!(wf.recover().await.unwrap(), RecoveryOutcome::DidNotAct);
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn expired_token_during_recovery_wipes_the_whole_session() {
    let store = Arc::new(MemorySessionStore::new());
    let backend = Arc::new(MockBackend::new());
    store.store_login(&student_auth()).await.unwrap();
    backend.expire_all_tokens();
    let wf = workflow(&store, &backend, Arc::new(AcceptAll));

    let outcome = wf
        .handle_register_click(42, &RegistrationLink::InternalForm)
        .await
        .unwrap();

    assert_eq!(outcome, RecoveryOutcome::SessionExpired);
    assert_eq!(store.snapshot().await, Session::default());
}

#[tokio::test]
async fn expired_token_on_reads_wipes_the_session_too() {
    // Student read.
    let store = Arc::new(MemorySessionStore::new());
    let backend = Arc::new(MockBackend::new());
    store.store_login(&student_auth()).await.unwrap();
    backend.expire_all_tokens();
    let students = StudentApi::new(store.clone(), backend.clone());
    assert_eq!(students.my_registrations().await.unwrap(), Fetched::SessionExpired);
    assert_eq!(store.snapshot().await, Session::default());

    // Faculty read.
    let store = Arc::new(MemorySessionStore::new());
    let backend = Arc::new(MockBackend::new());
    store.store_login(&faculty_auth()).await.unwrap();
    backend.expire_all_tokens();
    let faculty = FacultyApi::new(store.clone(), backend.clone());
    assert_eq!(faculty.my_events().await.unwrap(), Fetched::SessionExpired);
    assert_eq!(store.snapshot().await, Session::default());
}

#[tokio::test]
async fn failed_form_update_leaves_all_state_for_retry() {
    let store = Arc::new(MemorySessionStore::new());
    let backend = Arc::new(MockBackend::new());
    store.store_login(&student_auth()).await.unwrap();
    let wf = workflow(&store, &backend, Arc::new(AcceptAll));

    wf.handle_register_click(42, &RegistrationLink::InternalForm).await.unwrap();
    backend.fail_form_updates();

    let mut form = FormData::new();
    form.insert("Name", "Asha");
    assert!(wf.submit_form(&form).await.is_err());
    assert!(store.registration_id().await.is_some());
}

#[tokio::test]
async fn form_submit_without_registration_id_sends_nothing() {
    let store = Arc::new(MemorySessionStore::new());
    let backend = Arc::new(MockBackend::new());
    store.store_login(&student_auth()).await.unwrap();
    let wf = workflow(&store, &backend, Arc::new(AcceptAll));

    let outcome = wf.submit_form(&FormData::new()).await.unwrap();
    assert_eq!(outcome, FormOutcome::MissingRegistration);
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn login_replays_saved_intent_before_role_redirect() {
    let store = Arc::new(MemorySessionStore::new());
    let backend = Arc::new(
        MockBackend::new().with_user("asha@gmail.com", "Secret#1", student_auth()),
    );
    let wf = workflow(&store, &backend, Arc::new(AcceptAll));

    // Click while signed out: intent is parked, user goes to login.
    let outcome = wf
        .handle_register_click(42, &RegistrationLink::InternalForm)
        .await
        .unwrap();
    assert_eq!(outcome, RecoveryOutcome::RedirectToLogin);

    let flow = LoginFlow::new(store.clone(), backend.clone(), LoginPolicy::default());
    let outcome = flow.login("asha@gmail.com", "Secret#1", &wf).await.unwrap();

    assert!(matches!(outcome.recovery, RecoveryOutcome::InternalForm { .. }));
    assert_eq!(outcome.destination, Destination::ClubForm);
    assert!(store.saved_intent().await.is_none());
}

#[tokio::test]
async fn login_without_intent_redirects_by_role() {
    for (auth, expected) in [
        (student_auth(), Destination::StudentDashboard),
        (faculty_auth(), Destination::FacultyDashboard),
    ] {
        let store = Arc::new(MemorySessionStore::new());
        let backend =
            Arc::new(MockBackend::new().with_user("user@gmail.com", "Secret#1", auth));
        let wf = workflow(&store, &backend, Arc::new(AcceptAll));
        let flow = LoginFlow::new(store.clone(), backend.clone(), LoginPolicy::default());

        let outcome = flow.login("user@gmail.com", "Secret#1", &wf).await.unwrap();
        assert_eq!(outcome.recovery, RecoveryOutcome::DidNotAct);
        assert_eq!(outcome.destination, expected);
        assert!(store.is_authenticated().await);
    }
}

#[tokio::test]
async fn domain_policy_blocks_login_before_any_network_call() {
    let store = Arc::new(MemorySessionStore::new());
    let backend = Arc::new(MockBackend::new());
    let wf = workflow(&store, &backend, Arc::new(AcceptAll));
    let policy = LoginPolicy::new(vec!["@banasthali.in".into(), "@gmail.com".into()]);
    let flow = LoginFlow::new(store.clone(), backend.clone(), policy);

    let err = flow.login("someone@outlook.com", "pw", &wf).await.unwrap_err();
    assert!(matches!(err, LoginError::DomainNotAllowed));
    assert_eq!(backend.call_count(), 0);
    assert!(!store.is_authenticated().await);
}

#[tokio::test]
async fn wrong_credentials_map_to_tailored_errors() {
    let store = Arc::new(MemorySessionStore::new());
    let backend = Arc::new(
        MockBackend::new().with_user("asha@gmail.com", "Secret#1", student_auth()),
    );
    let wf = workflow(&store, &backend, Arc::new(AcceptAll));
    let flow = LoginFlow::new(store.clone(), backend.clone(), LoginPolicy::default());

    let err = flow.login("nobody@gmail.com", "pw", &wf).await.unwrap_err();
    assert!(matches!(err, LoginError::NotRegistered));

    let err = flow.login("asha@gmail.com", "wrong", &wf).await.unwrap_err();
    assert!(matches!(err, LoginError::IncorrectPassword));
    assert!(!store.is_authenticated().await);
}

#[tokio::test]
async fn duplicate_registration_surfaces_backend_error_and_keeps_intent() {
    let store = Arc::new(MemorySessionStore::new());
    let backend = Arc::new(MockBackend::new());
    store.store_login(&student_auth()).await.unwrap();
    let wf = workflow(&store, &backend, Arc::new(AcceptAll));

    wf.handle_register_click(42, &RegistrationLink::InternalForm).await.unwrap();
    // Same event again: the backend refuses, and the fresh intent stays
    // stored so the user sees the error with state intact.
    let err = wf.handle_register_click(42, &RegistrationLink::InternalForm).await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("already registered"), "unexpected error: {msg}");
    assert!(store.saved_intent().await.is_some());
}

#[tokio::test]
async fn faculty_event_crud_round_trip() {
    let store = Arc::new(MemorySessionStore::new());
    let backend = Arc::new(MockBackend::new());
    store.store_login(&faculty_auth()).await.unwrap();
    let faculty = FacultyApi::new(store.clone(), backend.clone());

    let draft = models::EventDraft {
        club_id: String::new(),
        event_name: "Robotics Demo".into(),
        description: "Annual demo day".into(),
        venue_id: Some("V2".into()),
        event_date: None,
        event_time: None,
        deadline: None,
        registration_form_link: String::new(),
    };
    assert_eq!(faculty.add_event(&draft).await.unwrap(), Fetched::Ok(()));

    let Fetched::Ok(found) = faculty.find_event("Robotics Demo").await.unwrap() else {
        panic!("expected event lookup to succeed");
    };
    assert_eq!(found.club_id, "C01");
    // Empty link defaulted to the internal-form sentinel on add.
    assert_eq!(found.registration_form_link, "club_form_link");

    let mut updated = draft.clone();
    updated.event_name = "Robotics Demo 2".into();
    updated.registration_form_link = "https://forms.example.com".into();
    assert_eq!(
        faculty.update_event(found.event_id, &updated).await.unwrap(),
        Fetched::Ok(())
    );

    assert_eq!(faculty.delete_event(found.event_id).await.unwrap(), Fetched::Ok(()));
    let Fetched::Ok(events) = faculty.my_events().await.unwrap() else {
        panic!("expected events list");
    };
    assert!(events.is_empty());
}

#[tokio::test]
async fn faculty_reviews_student_submission() {
    let store = Arc::new(MemorySessionStore::new());
    let backend = Arc::new(MockBackend::new());

    // Faculty sets up the event.
    store.store_login(&faculty_auth()).await.unwrap();
    let faculty = FacultyApi::new(store.clone(), backend.clone());
    let draft = models::EventDraft {
        club_id: String::new(),
        event_name: "Tryouts".into(),
        description: String::new(),
        venue_id: None,
        event_date: None,
        event_time: None,
        deadline: None,
        registration_form_link: String::new(),
    };
    faculty.add_event(&draft).await.unwrap();

    // Student registers for it (event ids start at 1 in the mock).
    let student_store = Arc::new(MemorySessionStore::new());
    student_store.store_login(&student_auth()).await.unwrap();
    let wf = RegistrationWorkflow::new(student_store.clone(), backend.clone(), Arc::new(AcceptAll));
    let RecoveryOutcome::InternalForm { reg_id } = wf
        .handle_register_click(1, &RegistrationLink::InternalForm)
        .await
        .unwrap()
    else {
        panic!("expected internal-form registration");
    };

    let Fetched::Ok(subs) = faculty.submissions().await.unwrap() else {
        panic!("expected submissions list");
    };
    assert_eq!(subs.len(), 1);

    faculty.approve(reg_id).await.unwrap();
    let stored = backend.registration(reg_id).unwrap();
    assert_eq!(stored.status, models::RegistrationStatus::Approved);
}

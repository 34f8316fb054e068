pub mod auth;
pub mod errors;
pub mod event;
pub mod form;
pub mod intent;
pub mod registration;
pub mod role;

pub use auth::{AuthResponse, LoginRequest};
pub use errors::ModelError;
pub use event::{Event, EventDraft};
pub use form::FormData;
pub use intent::{RegistrationLink, SavedIntent};
pub use registration::{FormDataUpdate, NewRegistration, Registration, RegistrationStatus};
pub use role::{Destination, Role};

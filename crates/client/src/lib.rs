//! Portal client: the browser-side flows of the campus event portal as an
//! explicit, testable library.
//!
//! The [`gateway::Gateway`] speaks HTTP to the backend, the
//! [`backend::PortalBackend`] trait is the seam the workflows talk through,
//! and every flow threads a [`session::SessionStore`] instead of touching
//! global state. Authorization failures surface as tagged outcomes rather
//! than hidden side effects; callers decide where to navigate.

pub mod backend;
pub mod errors;
pub mod faculty;
pub mod gateway;
pub mod login;
pub mod student;
pub mod workflow;

pub use errors::ClientError;
pub use gateway::{ApiResponse, Gateway};

/// Result of an authenticated read/write once the session question has been
/// settled: either the payload, or "the session was expired and has been
/// wiped, send the user to login".
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Ok(T),
    SessionExpired,
}

use thiserror::Error;

use models::ModelError;
use session::SessionError;

/// Errors surfaced by gateway calls and the flows built on them.
///
/// `Api` carries the backend's response text because the login flow
/// discriminates failure causes by message content.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("decode error: {0}")]
    Decode(String),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}

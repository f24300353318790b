use crate::role::Role;
use hostelcare_core::CoreError;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Session could not be recovered; the client has already cleared state
    /// and navigated to the role's login page.
    #[error("{role} session is no longer authenticated")]
    Unauthenticated { role: Role },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("API returned {status}")]
    Api {
        status: StatusCode,
        body: serde_json::Value,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl SessionError {
    pub fn from_transport(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SessionError::Timeout {
                url: url.to_string(),
            }
        } else {
            SessionError::Network(err)
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SessionError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

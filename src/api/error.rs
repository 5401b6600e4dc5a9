use thiserror::Error;

use crate::models::Capability;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The server rejected our bearer token. The session has already been cleared.
    #[error("authentication expired, please log in again")]
    AuthExpired,

    #[error("request failed (HTTP {status}): {message}")]
    Request { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response body: {0}")]
    Decode(String),

    /// Rejected before anything was sent
    #[error("invalid request: {0}")]
    Invalid(String),

    #[error("not logged in")]
    NotAuthenticated,

    #[error("current admin is not allowed to {0}")]
    Forbidden(Capability),
}

impl ApiError {
    /// Callers must log the user out rather than fall back to local data
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, ApiError::AuthExpired)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

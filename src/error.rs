//! Error types for surat-client

use crate::compose::ValidationErrors;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Api {
        status: u16,
        message: Option<String>,
    },

    #[error("Response decoding error: {0}")]
    Decode(String),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Action cancelled")]
    Cancelled,

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The message to show the user for a failed operation.
    ///
    /// Uses the server's own `message` when the backend sent one,
    /// otherwise `fallback`. Validation failures keep their field
    /// messages.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Api {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Validation(errors) => errors.to_string(),
            _ => fallback.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

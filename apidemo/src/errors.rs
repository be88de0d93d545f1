use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Body could not be decoded (bad JSON, form, multipart or UTF-8 encoding, unsafe file name)
    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },

    /// An inline value exceeded its configured limit
    #[error("Payload too large: {message}")]
    PayloadTooLarge { message: String },

    /// A required query parameter was not supplied
    #[error("Missing required parameter '{name}'")]
    MissingRequiredParameter { name: String },

    /// Disk or stream failure
    #[error("I/O failure while trying to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedPayload { message: message.into() }
    }

    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            operation: operation.into(),
            source,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MalformedPayload { .. } => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::MissingRequiredParameter { .. } => StatusCode::BAD_REQUEST,
            Error::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::MalformedPayload { message } => message.clone(),
            Error::PayloadTooLarge { message } => message.clone(),
            Error::MissingRequiredParameter { name } => format!("Missing required query parameter '{name}'"),
            Error::Io { .. } | Error::Internal { .. } | Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Io { .. } | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::PayloadTooLarge { .. } => {
                tracing::warn!("Rejected oversized payload: {}", self);
            }
            Error::MalformedPayload { .. } | Error::MissingRequiredParameter { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        (self.status_code(), self.user_message()).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

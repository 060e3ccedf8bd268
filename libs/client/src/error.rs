//! Client error types

use shop::{Redirect, StoreError, ValidationError};
use thiserror::Error;

/// Everything that can go wrong between the storefront and its collaborators
#[derive(Error, Debug)]
pub enum ClientError {
    /// Rejected locally, nothing was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The current session may not perform this action
    #[error("Access denied, continue at {}", .0.path())]
    Gate(Redirect),

    /// The collaborator has no such resource
    #[error("{0}")]
    NotFound(String),

    /// Any other non-success status, with the server's message
    #[error("Request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    /// Connection, TLS or timeout failure
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not what the endpoint promises
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Local state could not be persisted
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }

    /// HTTP status for collaborator errors
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::NotFound(_) => Some(404),
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

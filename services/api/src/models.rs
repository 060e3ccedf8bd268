//! API payloads that are not domain types

use serde::Serialize;

/// Response for `POST /api/upload`
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// Acknowledgement for deletions
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

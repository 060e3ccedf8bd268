//! Image upload endpoint

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
};
use tracing::{error, warn};

use crate::{
    error::{ApiError, ApiResult},
    models::UploadResponse,
    state::AppState,
    upload::is_image,
};

/// Multipart form field carrying the file
const IMAGE_FIELD: &str = "image";

pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let max_bytes = state.settings.max_upload_bytes;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("Malformed upload: {}", e);
        multipart_error(e)
    })? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        if !is_image(content_type.as_deref()) {
            return Err(ApiError::BadRequest("Images only!".to_string()));
        }
        let file_name = field.file_name().map(str::to_string);

        let bytes = field.bytes().await.map_err(|e| {
            warn!("Failed to read upload: {}", e);
            multipart_error(e)
        })?;

        if bytes.len() > max_bytes {
            return Err(ApiError::PayloadTooLarge(format!(
                "Image must be at most {} bytes",
                max_bytes
            )));
        }

        let url = state
            .image_store
            .put_image(
                bytes.to_vec(),
                content_type.as_deref().unwrap_or("application/octet-stream"),
                file_name.as_deref(),
            )
            .await
            .map_err(|e| {
                error!("Failed to store image: {}", e);
                ApiError::InternalServerError
            })?;

        return Ok(Json(UploadResponse { url }));
    }

    Err(ApiError::BadRequest("No image provided".to_string()))
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::BadRequest(err.body_text())
    }
}

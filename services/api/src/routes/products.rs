//! Catalog endpoints

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use shop::{Product, ProductInput};
use tracing::error;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::MessageResponse,
    state::AppState,
};

fn not_found() -> ApiError {
    ApiError::NotFound("Product not found".to_string())
}

/// Whole catalog, newest first
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    let products = state.product_repository.list().await.map_err(|e| {
        error!("Failed to list products: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Product>> {
    let product = state
        .product_repository
        .get(id)
        .await
        .map_err(|e| {
            error!("Failed to get product: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or_else(not_found)?;

    Ok(Json(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<ProductInput>,
) -> ApiResult<impl IntoResponse> {
    let input = payload.normalized();
    input.validate()?;

    let product = state
        .product_repository
        .create(&input)
        .await
        .map_err(|e| {
            error!("Failed to create product: {}", e);
            ApiError::InternalServerError
        })?;

    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductInput>,
) -> ApiResult<Json<Product>> {
    let input = payload.normalized();
    input.validate()?;

    let product = state
        .product_repository
        .update(id, &input)
        .await
        .map_err(|e| {
            error!("Failed to update product: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or_else(not_found)?;

    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let removed = state.product_repository.delete(id).await.map_err(|e| {
        error!("Failed to delete product: {}", e);
        ApiError::InternalServerError
    })?;

    if !removed {
        return Err(not_found());
    }

    Ok(Json(MessageResponse::new("Product removed")))
}

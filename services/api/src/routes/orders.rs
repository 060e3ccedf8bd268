//! Order endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use shop::{NewOrderRequest, Order};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::MessageResponse,
    state::AppState,
};

fn not_found() -> ApiError {
    ApiError::NotFound("Order not found".to_string())
}

/// Place an order for the caller
pub async fn create_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<NewOrderRequest>,
) -> ApiResult<impl IntoResponse> {
    let request = payload.verified(state.settings.shipping_fee)?;

    let order = state
        .order_repository
        .create(auth.id, request)
        .await
        .map_err(|e| {
            error!("Failed to create order: {}", e);
            ApiError::InternalServerError
        })?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// Orders of the caller
pub async fn my_orders(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Order>>> {
    let orders = state
        .order_repository
        .list_for_user(auth.id)
        .await
        .map_err(|e| {
            error!("Failed to list orders for {}: {}", auth.id, e);
            ApiError::InternalServerError
        })?;

    Ok(Json(orders))
}

/// Single order, visible to its owner and to administrators
pub async fn get_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Order>> {
    let order = state
        .order_repository
        .get(id)
        .await
        .map_err(|e| {
            error!("Failed to get order: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or_else(not_found)?;

    if order.user.id != auth.id && !auth.is_admin() {
        return Err(ApiError::Forbidden);
    }

    Ok(Json(order))
}

pub async fn list_orders(State(state): State<AppState>) -> ApiResult<Json<Vec<Order>>> {
    let orders = state.order_repository.list_all().await.map_err(|e| {
        error!("Failed to list orders: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Json(orders))
}

pub async fn deliver_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Order>> {
    let order = state
        .order_repository
        .mark_delivered(id)
        .await
        .map_err(|e| {
            error!("Failed to mark order {} delivered: {}", id, e);
            ApiError::InternalServerError
        })?
        .ok_or_else(not_found)?;

    info!("Order {} confirmed delivered by {}", id, auth.id);

    Ok(Json(order))
}

pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let removed = state.order_repository.delete(id).await.map_err(|e| {
        error!("Failed to delete order: {}", e);
        ApiError::InternalServerError
    })?;

    if !removed {
        return Err(not_found());
    }

    Ok(Json(MessageResponse::new("Order removed")))
}

//! API service routes

mod orders;
mod products;
mod upload;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde_json::json;

use crate::{
    middleware::{auth_middleware, require_admin},
    state::AppState,
};

/// Multipart framing allowance on top of the image itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let upload_limit = state.settings.max_upload_bytes + MULTIPART_OVERHEAD;

    let admin_routes = Router::new()
        .route("/api/products", post(products::create_product))
        .route(
            "/api/products/:id",
            put(products::update_product).delete(products::delete_product),
        )
        .route("/api/orders", get(orders::list_orders))
        .route("/api/orders/:id", delete(orders::delete_order))
        .route("/api/orders/:id/deliver", put(orders::deliver_order))
        .route(
            "/api/upload",
            post(upload::upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route_layer(middleware::from_fn(require_admin));

    let protected_routes = Router::new()
        .route("/api/orders", post(orders::create_order))
        .route("/api/orders/mine", get(orders::my_orders))
        .route("/api/orders/:id", get(orders::get_order))
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/products", get(products::list_products))
        .route("/api/products/:id", get(products::get_product))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}

//! Application state shared across handlers

use common::cache::RedisPool;

use crate::{
    middleware::TokenVerifier,
    repositories::{OrderRepository, ProductRepository},
    settings::ApiSettings,
    upload::ImageStore,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub redis_pool: RedisPool,
    pub verifier: TokenVerifier,
    pub product_repository: ProductRepository,
    pub order_repository: OrderRepository,
    pub image_store: ImageStore,
    pub settings: ApiSettings,
}

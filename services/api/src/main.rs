use anyhow::Result;
use aws_config::BehaviorVersion;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod middleware;
mod models;
mod repositories;
mod routes;
mod settings;
mod state;
mod upload;

use common::{
    cache::{RedisConfig, RedisPool},
    database::{self, DatabaseConfig},
    settings::ServiceSettings,
};
use tokio::net::TcpListener;

use crate::{
    middleware::{JwtConfig, TokenVerifier},
    repositories::{OrderRepository, ProductRepository},
    settings::ApiSettings,
    state::AppState,
    upload::{ImageStore, S3Config},
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting API service");

    let service_settings = ServiceSettings::load("API", 3001)?;
    let settings = ApiSettings::load()?;
    info!("Shipping fee: {}", settings.shipping_fee);

    let db_config = DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::run_migrations(&pool).await?;

    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;

    let verifier = TokenVerifier::new(&JwtConfig::from_env()?);

    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let image_store = ImageStore::new(aws_sdk_s3::Client::new(&aws_config), S3Config::from_env());

    let app_state = AppState {
        redis_pool,
        verifier,
        product_repository: ProductRepository::new(pool.clone()),
        order_repository: OrderRepository::new(pool),
        image_store,
        settings,
    };

    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(service_settings.bind_address()).await?;
    info!("API service listening on {}", service_settings.bind_address());

    axum::serve(listener, app).await?;

    Ok(())
}

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod bootstrap;
mod error;
mod jwt;
mod middleware;
mod models;
mod rate_limiter;
mod repositories;
mod routes;

use common::{
    cache::{RedisConfig, RedisPool},
    database::{self, DatabaseConfig},
    settings::ServiceSettings,
};
use tokio::net::TcpListener;

use crate::{
    jwt::{JwtConfig, JwtService},
    rate_limiter::{RateLimiter, RateLimiterConfig},
    repositories::UserRepository,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub redis_pool: RedisPool,
    pub jwt_service: JwtService,
    pub user_repository: UserRepository,
    pub rate_limiter: RateLimiter,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting authentication service");

    let settings = ServiceSettings::load("AUTH", 3000)?;

    let db_config = DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::run_migrations(&pool).await?;

    let jwt_service = JwtService::new(JwtConfig::from_env()?);

    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;

    let user_repository = UserRepository::new(pool);

    if let Some(seed) = bootstrap::AdminSeed::from_env()? {
        bootstrap::ensure_admin(&user_repository, seed).await?;
    }

    let app_state = AppState {
        redis_pool,
        jwt_service,
        user_repository,
        rate_limiter: RateLimiter::new(RateLimiterConfig::default()),
    };

    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(settings.bind_address()).await?;
    info!(
        "Authentication service listening on {}",
        settings.bind_address()
    );

    axum::serve(listener, app).await?;

    Ok(())
}

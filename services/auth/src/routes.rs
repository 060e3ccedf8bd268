//! Authentication service routes

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use shop::validation::{normalize_email, validate_email, validate_name, validate_password};
use tracing::{error, info, warn};

use crate::{
    AppState,
    error::AuthError,
    middleware::{AuthUser, auth_middleware, require_admin},
    models::{LoginRequest, NewUser, RegisterRequest, User, UserResponse},
    repositories::user::is_duplicate_email,
};

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/api/users", get(list_users))
        .route_layer(middleware::from_fn(require_admin));

    let protected = Router::new()
        .route("/api/users/profile", get(profile))
        .route("/api/users/logout", post(logout))
        .merge(admin)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/users/login", post(login))
        .route("/api/users/register", post(register))
        .merge(protected)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let email = normalize_email(&payload.email);
    info!("Login attempt for {}", email);

    if !state.rate_limiter.is_allowed(&email).await {
        return Err(AuthError::TooManyRequests);
    }

    let user = state
        .user_repository
        .find_by_email(&email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            AuthError::InternalServerError
        })?
        .ok_or(AuthError::InvalidCredentials)?;

    let valid = state
        .user_repository
        .verify_password(&user, &payload.password)
        .await
        .map_err(|e| {
            error!("Failed to verify password: {}", e);
            AuthError::InternalServerError
        })?;

    if !valid {
        warn!("Invalid password for {}", email);
        return Err(AuthError::InvalidCredentials);
    }

    state.rate_limiter.reset(&email).await;

    Ok((StatusCode::OK, session_response(&state, user)?))
}

/// Self-service registration endpoint
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let name = payload.name.trim().to_string();
    let email = normalize_email(&payload.email);

    validate_name(&name)?;
    validate_email(&email)?;
    validate_password(&payload.password)?;

    let existing = state
        .user_repository
        .find_by_email(&email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            AuthError::InternalServerError
        })?;

    if existing.is_some() {
        return Err(user_exists());
    }

    let user = state
        .user_repository
        .create(NewUser {
            name,
            email,
            password: payload.password,
            is_admin: false,
        })
        .await
        .map_err(|e| {
            if is_duplicate_email(&e) {
                return user_exists();
            }
            error!("Failed to create user: {}", e);
            AuthError::InternalServerError
        })?;

    info!("Registered user {}", user.id);

    Ok((StatusCode::CREATED, session_response(&state, user)?))
}

/// Profile of the authenticated caller
pub async fn profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserResponse>, AuthError> {
    let user = state
        .user_repository
        .find_by_id(auth.id)
        .await
        .map_err(|e| {
            error!("Failed to load profile: {}", e);
            AuthError::InternalServerError
        })?
        .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Revoke the caller's token until it would have expired anyway
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, AuthError> {
    let ttl = state
        .jwt_service
        .remaining_lifetime(&auth.claims)
        .map_err(|e| {
            error!("Failed to compute token lifetime: {}", e);
            AuthError::InternalServerError
        })?;

    state
        .redis_pool
        .revoke_token(&auth.token, ttl)
        .await
        .map_err(|e| {
            error!("Failed to revoke token: {}", e);
            AuthError::InternalServerError
        })?;

    info!("User {} logged out", auth.id);

    Ok(Json(
        serde_json::json!({"message": "Logged out successfully"}),
    ))
}

/// Every account, for administrators
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AuthError> {
    let users = state.user_repository.list_all().await.map_err(|e| {
        error!("Failed to list users: {}", e);
        AuthError::InternalServerError
    })?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

fn session_response(state: &AppState, user: User) -> Result<Json<shop::UserSession>, AuthError> {
    let token = state.jwt_service.generate_token(&user).map_err(|e| {
        error!("Failed to generate token: {}", e);
        AuthError::InternalServerError
    })?;

    Ok(Json(user.into_session(token)))
}

fn user_exists() -> AuthError {
    AuthError::BadRequest("User already exists".to_string())
}

//! Authentication routes for register, login and the current profile.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use tracing::info;

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::extractors::JsonBody;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use fintrack_core::auth::{hash_password, normalize_email, validate_registration, verify_password};
use fintrack_core::transaction::StoreError;
use fintrack_core::user::User;
use fintrack_shared::AppError;
use fintrack_shared::auth::{AuthResponse, LoginRequest, RegisterRequest, UserInfo};

/// Unknown email and wrong password share this message.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Creates the public auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
}

/// Auth routes that need a valid token.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

fn issue_token(state: &AppState, user: &User) -> ApiResult<AuthResponse> {
    let token = state
        .jwt_service
        .generate_access_token(user.id.into_inner(), &user.email)?;

    Ok(AuthResponse {
        user: user.info(),
        token,
        expires_in: state.jwt_service.access_token_expires_in(),
    })
}

/// POST /auth/register - Create an account and return a token.
async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    let registration = validate_registration(&payload)?;
    let password_hash = hash_password(&registration.password)?;

    let user = state
        .users
        .insert(User::new(registration, password_hash, Utc::now()))
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => {
                ApiError(AppError::Conflict("Email is already registered".to_string()))
            }
            other => ApiError::from(other),
        })?;

    info!(user_id = %user.id, "user registered");
    let body = issue_token(&state, &user)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(body, "Registration successful")),
    ))
}

/// POST /auth/login - Authenticate and return a token.
async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<Json<ApiResponse<AuthResponse>>> {
    let email = normalize_email(&payload.email);
    let invalid = || ApiError(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));

    let Some(user) = state.users.find_by_email(&email).await? else {
        info!("login attempt for unknown email");
        return Err(invalid());
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        info!(user_id = %user.id, "failed login attempt");
        return Err(invalid());
    }

    info!(user_id = %user.id, "user logged in");
    Ok(Json(ApiResponse::with_message(
        issue_token(&state, &user)?,
        "Login successful",
    )))
}

/// GET /auth/me - Profile of the token's owner.
async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<UserInfo>>> {
    let user = state
        .users
        .find_by_id(auth.user_id())
        .await?
        .ok_or_else(|| ApiError(AppError::NotFound("User not found".to_string())))?;

    Ok(Json(ApiResponse::ok(user.info())))
}

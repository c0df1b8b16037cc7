//! Handlers for the `/auth` resource (register, login).

use axum::extract::State;
use projman_core::error::CoreError;
use projman_core::user::{Registration, User};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::extract::Json;
use crate::middleware::request_context::RequestMeta;
use crate::response::ApiResponse;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful authentication response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: User,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    RequestMeta(ctx): RequestMeta,
    Json(input): Json<Registration>,
) -> AppResult<ApiResponse<User>> {
    let user = state.users.register(input, &ctx).await?;
    Ok(ApiResponse::created(user))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Unknown email and wrong password
/// produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    RequestMeta(ctx): RequestMeta,
    Json(input): Json<LoginRequest>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let user = state
        .users
        .find_by_email(&input.email)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into())))?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::warn!(user_id = user.id, "Login rejected");
        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    }

    state.users.record_login(user.id, &ctx).await?;

    let access_token = generate_access_token(user.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(ApiResponse::ok(AuthResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.config.jwt.expires_in_secs(),
        user,
    }))
}

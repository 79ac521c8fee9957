use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use kinboard_application::{AuthOutcome, RegisterParams};
use kinboard_core::{AppError, UserIdentity};
use tracing::info;

use crate::dto::{AuthTokenResponse, LoginRequest, RegisterRequest, UserIdentityResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /auth/register - Create an account and sign it in.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthTokenResponse>)> {
    let user = state
        .user_service
        .register(RegisterParams {
            email: payload.email,
            password: payload.password,
            display_name: payload.display_name,
        })
        .await?;

    let token = state.access_token_service.issue(&user)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthTokenResponse::new(token, &user)),
    ))
}

/// POST /auth/login - Exchange email and password for a bearer token.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<AuthTokenResponse>> {
    match state
        .user_service
        .login(payload.email.as_str(), payload.password.as_str())
        .await?
    {
        AuthOutcome::Authenticated(user) => {
            info!(user_id = %user.id, "user logged in");
            let token = state.access_token_service.issue(&user)?;
            Ok(Json(AuthTokenResponse::new(token, &user)))
        }
        AuthOutcome::Failed => {
            Err(AppError::Unauthorized("invalid email or password".to_owned()).into())
        }
    }
}

/// GET /auth/me - Return the caller resolved from the bearer token.
pub async fn me_handler(Extension(user): Extension<UserIdentity>) -> Json<UserIdentityResponse> {
    Json(UserIdentityResponse::from(user))
}

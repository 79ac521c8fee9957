use axum::extract::{Query, State};
use axum::http::StatusCode;
use kinboard_core::AppError;
use kinboard_domain::ConfirmationOutcome;
use tracing::{error, info};

use crate::dto::ConfirmInviteQuery;
use crate::state::AppState;

/// GET /confirm-invite?token= - Landing endpoint of the emailed link.
///
/// Answers in plain text because invitees open it straight from their mail
/// client.
pub async fn confirm_invite_handler(
    State(state): State<AppState>,
    Query(query): Query<ConfirmInviteQuery>,
) -> (StatusCode, &'static str) {
    match state.confirmation_service.confirm(query.token.as_str()).await {
        Ok(ConfirmationOutcome::Confirmed) => (StatusCode::OK, "Invite confirmed"),
        Ok(ConfirmationOutcome::AlreadyConfirmed) => (StatusCode::OK, "Invite already confirmed"),
        Err(failure) => confirmation_failure(&failure),
    }
}

fn confirmation_failure(failure: &AppError) -> (StatusCode, &'static str) {
    match failure {
        AppError::NotFound(_) => {
            info!(error = %failure, "confirmation link points at no invite");
            (StatusCode::BAD_REQUEST, "Unable to confirm invite")
        }
        AppError::MissingClaims(_) => (StatusCode::BAD_REQUEST, "Invalid token claims"),
        AppError::TokenExpired => (StatusCode::BAD_REQUEST, "Token has expired"),
        AppError::TokenInvalid(_) => (StatusCode::BAD_REQUEST, "Invalid token"),
        other => {
            error!(error = %other, "invite confirmation failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

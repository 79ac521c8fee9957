use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use kinboard_core::UserIdentity;
use kinboard_domain::{EventId, InviteId, Invitee};

use crate::dto::{CreateInviteRequest, CreatedInviteResponse, InviteResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::owner_id;

pub async fn list_invites_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(event_id): Path<i64>,
) -> ApiResult<Json<Vec<InviteResponse>>> {
    let invites = state
        .invite_service
        .list_invites(owner_id(&user), EventId::new(event_id))
        .await?
        .into_iter()
        .map(InviteResponse::from)
        .collect();

    Ok(Json(invites))
}

pub async fn create_invite_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(event_id): Path<i64>,
    Json(payload): Json<CreateInviteRequest>,
) -> ApiResult<(StatusCode, Json<CreatedInviteResponse>)> {
    let invitee = Invitee::new(payload.name, payload.email)?;
    let created = state
        .invite_service
        .create_invite(
            owner_id(&user),
            user.display_name(),
            EventId::new(event_id),
            invitee,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedInviteResponse::from(created)),
    ))
}

pub async fn delete_invite_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((event_id, invite_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    state
        .invite_service
        .delete_invite(
            owner_id(&user),
            EventId::new(event_id),
            InviteId::new(invite_id),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn resend_invite_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((event_id, invite_id)): Path<(i64, i64)>,
) -> ApiResult<Json<InviteResponse>> {
    let invite = state
        .invite_service
        .resend_invitation(
            owner_id(&user),
            user.display_name(),
            EventId::new(event_id),
            InviteId::new(invite_id),
        )
        .await?;

    Ok(Json(InviteResponse::from(invite)))
}

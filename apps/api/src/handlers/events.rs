use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use kinboard_core::UserIdentity;
use kinboard_domain::{EventDetails, EventId};

use crate::dto::{EventRequest, EventResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::owner_id;

pub async fn list_events_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<EventResponse>>> {
    let events = state
        .event_service
        .list_events(owner_id(&user))
        .await?
        .into_iter()
        .map(EventResponse::from)
        .collect();

    Ok(Json(events))
}

pub async fn create_event_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<EventRequest>,
) -> ApiResult<(StatusCode, Json<EventResponse>)> {
    let details = EventDetails::new(payload.name, payload.date, payload.time, payload.location)?;
    let event = state
        .event_service
        .create_event(owner_id(&user), details)
        .await?;

    Ok((StatusCode::CREATED, Json(EventResponse::from(event))))
}

pub async fn get_event_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(event_id): Path<i64>,
) -> ApiResult<Json<EventResponse>> {
    let event = state
        .event_service
        .get_event(owner_id(&user), EventId::new(event_id))
        .await?;

    Ok(Json(EventResponse::from(event)))
}

pub async fn update_event_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(event_id): Path<i64>,
    Json(payload): Json<EventRequest>,
) -> ApiResult<Json<EventResponse>> {
    let details = EventDetails::new(payload.name, payload.date, payload.time, payload.location)?;
    let event = state
        .event_service
        .update_event(owner_id(&user), EventId::new(event_id), details)
        .await?;

    Ok(Json(EventResponse::from(event)))
}

pub async fn delete_event_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(event_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state
        .event_service
        .delete_event(owner_id(&user), EventId::new(event_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

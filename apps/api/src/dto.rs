use chrono::{NaiveDate, NaiveTime};
use kinboard_application::{AccessToken, CreatedInvite, UserRecord};
use kinboard_core::UserIdentity;
use kinboard_domain::{Event, Invite, InviteStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub postgres: &'static str,
}

/// Incoming payload for registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

/// Incoming payload for password login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// API representation of the authenticated user.
#[derive(Debug, Serialize)]
pub struct UserIdentityResponse {
    pub user_id: Uuid,
    pub display_name: String,
    pub email: String,
}

impl From<&UserRecord> for UserIdentityResponse {
    fn from(value: &UserRecord) -> Self {
        Self {
            user_id: value.id.as_uuid(),
            display_name: value.display_name.clone(),
            email: value.email.clone(),
        }
    }
}

impl From<UserIdentity> for UserIdentityResponse {
    fn from(value: UserIdentity) -> Self {
        Self {
            user_id: value.user_id(),
            display_name: value.display_name().to_owned(),
            email: value.email().to_owned(),
        }
    }
}

/// Bearer token issued after login or registration.
#[derive(Debug, Serialize)]
pub struct AuthTokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: UserIdentityResponse,
}

impl AuthTokenResponse {
    pub fn new(token: AccessToken, user: &UserRecord) -> Self {
        Self {
            access_token: token.token,
            token_type: "Bearer",
            expires_in: token.expires_in,
            user: UserIdentityResponse::from(user),
        }
    }
}

/// Incoming payload for event creation and replacement.
#[derive(Debug, Deserialize)]
pub struct EventRequest {
    pub name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[serde(default)]
    pub location: String,
}

/// API representation of an event.
#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub id: i64,
    pub name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
}

impl From<Event> for EventResponse {
    fn from(value: Event) -> Self {
        let details = value.details();
        Self {
            id: value.id().value(),
            name: details.name().to_owned(),
            date: details.date(),
            time: details.time(),
            location: details.location().to_owned(),
        }
    }
}

/// Incoming payload for invite creation.
#[derive(Debug, Deserialize)]
pub struct CreateInviteRequest {
    pub name: String,
    pub email: String,
}

/// API representation of an invite.
#[derive(Debug, Serialize)]
pub struct InviteResponse {
    pub id: i64,
    pub event_id: i64,
    pub name: String,
    pub email: String,
    pub coming: bool,
    pub status: InviteStatus,
    pub reminder_sent: bool,
}

impl From<Invite> for InviteResponse {
    fn from(value: Invite) -> Self {
        Self {
            id: value.id().value(),
            event_id: value.event_id().value(),
            name: value.invitee().name().to_owned(),
            email: value.invitee().email().as_str().to_owned(),
            coming: value.is_coming(),
            status: value.status(),
            reminder_sent: value.reminder_sent(),
        }
    }
}

/// Invite plus whether the invitation mail went out.
#[derive(Debug, Serialize)]
pub struct CreatedInviteResponse {
    #[serde(flatten)]
    pub invite: InviteResponse,
    pub invitation_sent: bool,
}

impl From<CreatedInvite> for CreatedInviteResponse {
    fn from(value: CreatedInvite) -> Self {
        Self {
            invite: InviteResponse::from(value.invite),
            invitation_sent: value.invitation_sent,
        }
    }
}

/// Query string of the confirmation link.
#[derive(Debug, Deserialize)]
pub struct ConfirmInviteQuery {
    #[serde(default)]
    pub token: String,
}

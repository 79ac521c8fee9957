use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, Header, decode, encode};
use serde::{Deserialize, Serialize};

use kinboard_core::{AppError, AppResult};
use kinboard_domain::{EventId, InviteId};

use super::{TokenSettings, map_decode_error};

/// Lifetime of a confirmation link.
pub const CONFIRMATION_TOKEN_LIFETIME_HOURS: i64 = 24;

const CONFIRMATION_AUDIENCE_SUFFIX: &str = "invite-confirmation";

/// Identifiers carried by a verified confirmation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationClaims {
    /// Invite being confirmed.
    pub invite_id: InviteId,
    /// Event the invite was issued for.
    pub event_id: EventId,
}

#[derive(Debug, Serialize)]
struct IssuedClaims<'a> {
    #[serde(rename = "inviteId")]
    invite_id: i64,
    #[serde(rename = "eventId")]
    event_id: i64,
    iat: i64,
    exp: i64,
    iss: &'a str,
    aud: &'a str,
}

#[derive(Debug, Deserialize)]
struct ReceivedClaims {
    #[serde(rename = "inviteId", default)]
    invite_id: Option<i64>,
    #[serde(rename = "eventId", default)]
    event_id: Option<i64>,
}

/// Issues and verifies the signed tokens embedded in confirmation links.
#[derive(Clone, Debug)]
pub struct ConfirmationTokenService {
    settings: TokenSettings,
    pub(super) audience: String,
}

impl ConfirmationTokenService {
    /// Creates a confirmation token service.
    #[must_use]
    pub fn new(settings: TokenSettings) -> Self {
        let audience = format!("{}:{CONFIRMATION_AUDIENCE_SUFFIX}", settings.audience());
        Self { settings, audience }
    }

    /// Issues a token for `(invite_id, event_id)` valid for 24 hours from now.
    pub fn issue(&self, invite_id: InviteId, event_id: EventId) -> AppResult<String> {
        self.issue_at(invite_id, event_id, Utc::now())
    }

    /// Issues a token as if it had been created at `issued_at`.
    pub fn issue_at(
        &self,
        invite_id: InviteId,
        event_id: EventId,
        issued_at: DateTime<Utc>,
    ) -> AppResult<String> {
        let claims = IssuedClaims {
            invite_id: invite_id.value(),
            event_id: event_id.value(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::hours(CONFIRMATION_TOKEN_LIFETIME_HOURS)).timestamp(),
            iss: self.settings.issuer(),
            aud: self.audience.as_str(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.settings.encoding_key(),
        )
        .map_err(|error| AppError::Internal(format!("failed to sign confirmation token: {error}")))
    }

    /// Verifies signature, issuer, audience and expiry, then extracts both ids.
    pub fn decode(&self, token: &str) -> AppResult<ConfirmationClaims> {
        let data = decode::<ReceivedClaims>(
            token,
            &self.settings.decoding_key(),
            &self.settings.validation(self.audience.as_str()),
        )
        .map_err(|error| map_decode_error(&error))?;

        let (Some(invite_id), Some(event_id)) = (data.claims.invite_id, data.claims.event_id)
        else {
            return Err(AppError::MissingClaims(
                "confirmation token must carry inviteId and eventId".to_owned(),
            ));
        };

        Ok(ConfirmationClaims {
            invite_id: InviteId::new(invite_id),
            event_id: EventId::new(event_id),
        })
    }
}

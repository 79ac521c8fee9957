use chrono::{TimeDelta, Utc};
use jsonwebtoken::{Algorithm, Header, decode, encode};
use serde::{Deserialize, Serialize};

use kinboard_core::{AppError, AppResult, UserIdentity};

use super::TokenSettings;
use crate::UserRecord;

const ACCESS_AUDIENCE_SUFFIX: &str = "api";

/// Signed bearer credential handed out after login or registration.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// Encoded JWT.
    pub token: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    sub: uuid::Uuid,
    name: String,
    email: String,
    iat: i64,
    exp: i64,
    iss: String,
    aud: String,
}

/// Issues and verifies bearer tokens for the owner-facing API.
#[derive(Clone, Debug)]
pub struct AccessTokenService {
    settings: TokenSettings,
    audience: String,
    lifetime: TimeDelta,
}

impl AccessTokenService {
    /// Creates an access token service issuing tokens valid for `lifetime_minutes`.
    ///
    /// The lifetime must be positive and the resulting expiry must be a
    /// representable timestamp.
    pub fn new(settings: TokenSettings, lifetime_minutes: i64) -> AppResult<Self> {
        if lifetime_minutes <= 0 {
            return Err(AppError::Validation(
                "access token lifetime must be greater than zero".to_owned(),
            ));
        }

        let lifetime = TimeDelta::try_minutes(lifetime_minutes)
            .filter(|lifetime| Utc::now().checked_add_signed(*lifetime).is_some())
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "access token lifetime of {lifetime_minutes} minutes is out of range"
                ))
            })?;

        let audience = format!("{}:{ACCESS_AUDIENCE_SUFFIX}", settings.audience());
        Ok(Self {
            settings,
            audience,
            lifetime,
        })
    }

    /// Issues a token for an authenticated user.
    pub fn issue(&self, user: &UserRecord) -> AppResult<AccessToken> {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(self.lifetime).ok_or_else(|| {
            AppError::Internal("access token expiry is out of range".to_owned())
        })?;
        let claims = AccessClaims {
            sub: user.id.as_uuid(),
            name: user.display_name.clone(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.settings.issuer().to_owned(),
            aud: self.audience.clone(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.settings.encoding_key(),
        )
        .map_err(|error| AppError::Internal(format!("failed to sign access token: {error}")))?;

        Ok(AccessToken {
            token,
            expires_in: self.lifetime.num_seconds(),
        })
    }

    /// Verifies a bearer token and resolves the caller identity.
    pub fn verify(&self, token: &str) -> AppResult<UserIdentity> {
        let data = decode::<AccessClaims>(
            token,
            &self.settings.decoding_key(),
            &self.settings.validation(self.audience.as_str()),
        )
        .map_err(|_| AppError::Unauthorized("invalid or expired access token".to_owned()))?;

        Ok(UserIdentity::new(
            data.claims.sub,
            data.claims.name,
            data.claims.email,
        ))
    }
}

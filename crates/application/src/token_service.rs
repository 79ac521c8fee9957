//! Signed JWT tokens for invite confirmation links and API access.
//!
//! Both token kinds are HS256 JWTs signed with the same secret and issuer.
//! They are separated by audience so that a confirmation link can never be
//! replayed as a bearer credential and vice versa.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Validation};

use kinboard_core::{AppError, AppResult};

mod access;
mod confirmation;


pub use access::{AccessToken, AccessTokenService};
pub use confirmation::{
    CONFIRMATION_TOKEN_LIFETIME_HOURS, ConfirmationClaims, ConfirmationTokenService,
};

/// Minimum HMAC secret length accepted at startup.
const MIN_SECRET_LENGTH: usize = 32;

/// Shared signing configuration.
#[derive(Clone)]
pub struct TokenSettings {
    secret: String,
    issuer: String,
    audience: String,
}

impl TokenSettings {
    /// Validates the signing secret and issuer.
    pub fn new(secret: impl Into<String>, issuer: impl Into<String>) -> AppResult<Self> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(AppError::Validation(format!(
                "token secret must be at least {MIN_SECRET_LENGTH} characters"
            )));
        }

        let issuer = issuer.into();
        if issuer.trim().is_empty() {
            return Err(AppError::Validation(
                "token issuer must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            secret,
            audience: issuer.clone(),
            issuer,
        })
    }

    /// Overrides the audience prefix, which defaults to the issuer.
    pub fn with_audience(mut self, audience: impl Into<String>) -> AppResult<Self> {
        let audience = audience.into();
        if audience.trim().is_empty() {
            return Err(AppError::Validation(
                "token audience must not be empty".to_owned(),
            ));
        }

        self.audience = audience;
        Ok(self)
    }

    /// Issuer claim written into and required from every token.
    #[must_use]
    pub fn issuer(&self) -> &str {
        self.issuer.as_str()
    }

    /// Prefix of the audience claims. Each token kind appends its own suffix.
    #[must_use]
    pub fn audience(&self) -> &str {
        self.audience.as_str()
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.secret.as_bytes())
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.secret.as_bytes())
    }

    fn validation(&self, audience: &str) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation
    }
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("TokenSettings")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

/// Maps a `jsonwebtoken` verification failure onto the token error taxonomy.
fn map_decode_error(error: &jsonwebtoken::errors::Error) -> AppError {
    match error.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        other => AppError::TokenInvalid(format!("{other:?}")),
    }
}

use kinboard_core::{AppError, NonEmptyString};
use kinboard_domain::{EmailAddress, validate_password};
use tracing::info;

use super::*;

impl UserService {
    /// Registers a new user with email and password.
    pub async fn register(&self, params: RegisterParams) -> AppResult<UserRecord> {
        let email_address = EmailAddress::new(&params.email)?;
        let display_name = NonEmptyString::new(params.display_name)?;
        validate_password(&params.password)?;

        let existing = self
            .user_repository
            .find_by_email(email_address.as_str())
            .await?;

        if existing.is_some() {
            // Hash anyway so both branches take the same time.
            let _ = self.password_hasher.hash_password(&params.password).await;
            return Err(AppError::Conflict(
                "an account with this email already exists".to_owned(),
            ));
        }

        let password_hash = self
            .password_hasher
            .hash_password(&params.password)
            .await?;
        let user = self
            .user_repository
            .create(
                email_address.as_str(),
                display_name.as_str(),
                password_hash.as_str(),
            )
            .await?;

        info!(user_id = %user.id, "user registered");
        Ok(user)
    }
}

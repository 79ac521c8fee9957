use kinboard_domain::EmailAddress;

use super::*;

impl UserService {
    /// Authenticates a user with email and password.
    ///
    /// Returns `AuthOutcome::Failed` for an unknown email, a malformed email
    /// and a wrong password alike.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthOutcome> {
        let Ok(email_address) = EmailAddress::new(email) else {
            let _ = self.password_hasher.hash_password(password).await;
            return Ok(AuthOutcome::Failed);
        };

        let Some(user) = self
            .user_repository
            .find_by_email(email_address.as_str())
            .await?
        else {
            // Always hash so unknown accounts cost the same as known ones.
            let _ = self.password_hasher.hash_password(password).await;
            return Ok(AuthOutcome::Failed);
        };

        if !self
            .password_hasher
            .verify_password(password, user.password_hash.as_str())
            .await?
        {
            return Ok(AuthOutcome::Failed);
        }

        Ok(AuthOutcome::Authenticated(user))
    }
}

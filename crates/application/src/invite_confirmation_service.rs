use std::sync::Arc;

use tracing::info;

use kinboard_core::{AppError, AppResult};
use kinboard_domain::{ConfirmationOutcome, EventId, InviteId};

use crate::{ConfirmationTokenService, InviteRepository};

/// Resolves confirmation links into invite state changes.
#[derive(Clone)]
pub struct InviteConfirmationService {
    invite_repository: Arc<dyn InviteRepository>,
    token_service: ConfirmationTokenService,
}

impl InviteConfirmationService {
    /// Creates a confirmation service.
    #[must_use]
    pub fn new(
        invite_repository: Arc<dyn InviteRepository>,
        token_service: ConfirmationTokenService,
    ) -> Self {
        Self {
            invite_repository,
            token_service,
        }
    }

    /// Verifies `token` and marks the referenced invite as coming.
    ///
    /// Confirming an invite that is already coming succeeds with
    /// [`ConfirmationOutcome::AlreadyConfirmed`] and writes nothing. An
    /// invite that does not exist, or exists under another event than the
    /// token names, yields `NotFound`.
    pub async fn confirm(&self, token: &str) -> AppResult<ConfirmationOutcome> {
        let claims = self.token_service.decode(token)?;

        let invite = self
            .invite_repository
            .find_invite(claims.invite_id)
            .await?
            .filter(|invite| invite.belongs_to(claims.event_id))
            .ok_or_else(|| invite_not_found(claims.invite_id, claims.event_id))?;

        if invite.is_coming() {
            return Ok(ConfirmationOutcome::AlreadyConfirmed);
        }

        let outcome = if self
            .invite_repository
            .mark_confirmed(claims.invite_id)
            .await?
        {
            ConfirmationOutcome::Confirmed
        } else {
            // A concurrent confirmation won the conditional update.
            ConfirmationOutcome::AlreadyConfirmed
        };

        info!(
            invite_id = %claims.invite_id,
            event_id = %claims.event_id,
            ?outcome,
            "invite confirmation processed"
        );

        Ok(outcome)
    }
}

fn invite_not_found(invite_id: InviteId, event_id: EventId) -> AppError {
    AppError::NotFound(format!(
        "invite '{invite_id}' does not exist for event '{event_id}'"
    ))
}

//! Owner-facing invite management.

use std::sync::Arc;

use tracing::{info, warn};

use kinboard_core::{AppError, AppResult};
use kinboard_domain::{Event, EventId, Invite, InviteId, Invitee, UserId};

use crate::event_service::load_owned_event;
use crate::{EventRepository, InviteMailer, InviteRepository};

/// Invite stored by [`InviteService::create_invite`].
#[derive(Debug, Clone)]
pub struct CreatedInvite {
    /// Persisted invite.
    pub invite: Invite,
    /// Whether the invitation mail was handed to the transport.
    pub invitation_sent: bool,
}

/// Application service for creating, listing and resending invites.
#[derive(Clone)]
pub struct InviteService {
    event_repository: Arc<dyn EventRepository>,
    invite_repository: Arc<dyn InviteRepository>,
    mailer: InviteMailer,
}

impl InviteService {
    /// Creates a new invite service.
    #[must_use]
    pub fn new(
        event_repository: Arc<dyn EventRepository>,
        invite_repository: Arc<dyn InviteRepository>,
        mailer: InviteMailer,
    ) -> Self {
        Self {
            event_repository,
            invite_repository,
            mailer,
        }
    }

    /// Invites somebody to one of the caller's events and mails them a
    /// confirmation link.
    ///
    /// The invite is kept even when the mail cannot be delivered; the owner
    /// can retry with [`InviteService::resend_invitation`].
    pub async fn create_invite(
        &self,
        owner_id: UserId,
        owner_name: &str,
        event_id: EventId,
        invitee: Invitee,
    ) -> AppResult<CreatedInvite> {
        let event = load_owned_event(self.event_repository.as_ref(), owner_id, event_id).await?;
        let invite = self
            .invite_repository
            .create_invite(event_id, &invitee)
            .await?;

        let invitation_sent = match self.mailer.send_invite(&invite, &event, owner_name).await {
            Ok(()) => {
                info!(invite_id = %invite.id(), event_id = %event_id, "invitation sent");
                true
            }
            Err(error) => {
                warn!(
                    error = %error,
                    invite_id = %invite.id(),
                    event_id = %event_id,
                    "failed to send invitation"
                );
                false
            }
        };

        Ok(CreatedInvite {
            invite,
            invitation_sent,
        })
    }

    /// Lists the invites of one of the caller's events.
    pub async fn list_invites(&self, owner_id: UserId, event_id: EventId) -> AppResult<Vec<Invite>> {
        load_owned_event(self.event_repository.as_ref(), owner_id, event_id).await?;
        self.invite_repository.list_invites_for_event(event_id).await
    }

    /// Removes an invite from one of the caller's events.
    pub async fn delete_invite(
        &self,
        owner_id: UserId,
        event_id: EventId,
        invite_id: InviteId,
    ) -> AppResult<()> {
        self.load_invite(owner_id, event_id, invite_id).await?;

        if !self.invite_repository.delete_invite(invite_id).await? {
            return Err(invite_not_found(invite_id, event_id));
        }

        Ok(())
    }

    /// Mails a fresh confirmation link for a pending invite.
    pub async fn resend_invitation(
        &self,
        owner_id: UserId,
        owner_name: &str,
        event_id: EventId,
        invite_id: InviteId,
    ) -> AppResult<Invite> {
        let (event, invite) = self.load_invite(owner_id, event_id, invite_id).await?;

        if invite.is_coming() {
            return Err(AppError::Conflict(format!(
                "invite '{invite_id}' is already confirmed"
            )));
        }

        self.mailer.send_invite(&invite, &event, owner_name).await?;
        info!(invite_id = %invite_id, event_id = %event_id, "invitation resent");

        Ok(invite)
    }

    async fn load_invite(
        &self,
        owner_id: UserId,
        event_id: EventId,
        invite_id: InviteId,
    ) -> AppResult<(Event, Invite)> {
        let event = load_owned_event(self.event_repository.as_ref(), owner_id, event_id).await?;

        let invite = self
            .invite_repository
            .find_invite(invite_id)
            .await?
            .filter(|invite| invite.belongs_to(event_id))
            .ok_or_else(|| invite_not_found(invite_id, event_id))?;

        Ok((event, invite))
    }
}

fn invite_not_found(invite_id: InviteId, event_id: EventId) -> AppError {
    AppError::NotFound(format!(
        "invite '{invite_id}' does not exist for event '{event_id}'"
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use kinboard_core::AppError;
    use kinboard_domain::{EventId, InviteId, Invitee, UserId};

    use super::InviteService;
    use crate::test_support::{InMemoryStore, RecordingEmailService, mailer};

    struct Fixture {
        store: Arc<InMemoryStore>,
        email_service: Arc<RecordingEmailService>,
        service: InviteService,
        owner: UserId,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::default());
        let email_service = Arc::new(RecordingEmailService::default());
        let owner = UserId::new();
        store.seed_event(
            3,
            owner,
            NaiveDate::from_ymd_opt(2026, 12, 24).unwrap_or_default(),
        );
        let service = InviteService::new(store.clone(), store.clone(), mailer(email_service.clone()));

        Fixture {
            store,
            email_service,
            service,
            owner,
        }
    }

    fn invitee(email: &str) -> Invitee {
        Invitee::new("Cousin Ada", email).unwrap_or_else(|_| unreachable!())
    }

    #[tokio::test]
    async fn create_invite_stores_and_mails() {
        let fixture = fixture();

        let created = fixture
            .service
            .create_invite(fixture.owner, "Mom", EventId::new(3), invitee("ada@example.com"))
            .await;
        assert!(created.is_ok());
        let created = created.unwrap_or_else(|_| unreachable!());

        assert!(created.invitation_sent);
        assert!(!created.invite.is_coming());
        assert!(!created.invite.reminder_sent());
        assert_eq!(fixture.email_service.sent().len(), 1);
        assert_eq!(fixture.email_service.sent()[0].to, "ada@example.com");
    }

    #[tokio::test]
    async fn delivery_failure_keeps_the_invite() {
        let fixture = fixture();
        fixture.email_service.fail_for("ada@example.com");

        let created = fixture
            .service
            .create_invite(fixture.owner, "Mom", EventId::new(3), invitee("ada@example.com"))
            .await
            .unwrap_or_else(|_| unreachable!());

        assert!(!created.invitation_sent);
        assert!(fixture.store.invite(created.invite.id().value()).is_some());

        assert!(matches!(
            fixture
                .service
                .resend_invitation(fixture.owner, "Mom", EventId::new(3), created.invite.id())
                .await,
            Err(AppError::Delivery(_))
        ));

        fixture.email_service.recover("ada@example.com");
        assert!(
            fixture
                .service
                .resend_invitation(fixture.owner, "Mom", EventId::new(3), created.invite.id())
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn duplicate_email_on_same_event_conflicts() {
        let fixture = fixture();
        let _ = fixture
            .service
            .create_invite(fixture.owner, "Mom", EventId::new(3), invitee("ada@example.com"))
            .await;

        assert!(matches!(
            fixture
                .service
                .create_invite(fixture.owner, "Mom", EventId::new(3), invitee("ADA@example.com"))
                .await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn strangers_cannot_touch_invites() {
        let fixture = fixture();
        fixture.store.seed_invite(7, 3, "guest@example.com");
        let stranger = UserId::new();

        assert!(matches!(
            fixture
                .service
                .create_invite(stranger, "Eve", EventId::new(3), invitee("eve@example.com"))
                .await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            fixture.service.list_invites(stranger, EventId::new(3)).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            fixture
                .service
                .delete_invite(stranger, EventId::new(3), InviteId::new(7))
                .await,
            Err(AppError::NotFound(_))
        ));
        assert!(fixture.store.invite(7).is_some());
    }

    #[tokio::test]
    async fn invite_addressed_through_wrong_event_is_not_found() {
        let fixture = fixture();
        fixture.store.seed_event(
            4,
            fixture.owner,
            NaiveDate::from_ymd_opt(2026, 12, 25).unwrap_or_default(),
        );
        fixture.store.seed_invite(5, 4, "guest@example.com");

        assert!(matches!(
            fixture
                .service
                .delete_invite(fixture.owner, EventId::new(3), InviteId::new(5))
                .await,
            Err(AppError::NotFound(_))
        ));
        assert!(
            fixture
                .service
                .delete_invite(fixture.owner, EventId::new(4), InviteId::new(5))
                .await
                .is_ok()
        );
        assert!(fixture.store.invite(5).is_none());
    }

    #[tokio::test]
    async fn confirmed_invite_is_not_resent() {
        let fixture = fixture();
        fixture.store.seed_invite(7, 3, "guest@example.com");
        let _ = crate::InviteRepository::mark_confirmed(fixture.store.as_ref(), InviteId::new(7)).await;

        assert!(matches!(
            fixture
                .service
                .resend_invitation(fixture.owner, "Mom", EventId::new(3), InviteId::new(7))
                .await,
            Err(AppError::Conflict(_))
        ));
        assert!(fixture.email_service.sent().is_empty());
    }
}

use async_trait::async_trait;
use chrono::NaiveDate;

use kinboard_core::AppResult;
use kinboard_domain::{Event, EventId, Invite, InviteId, Invitee};

/// Invite joined with the event it belongs to, selected for a reminder.
#[derive(Debug, Clone)]
pub struct DueReminder {
    /// Invite still waiting for its reminder.
    pub invite: Invite,
    /// Event the invite points at.
    pub event: Event,
}

/// Repository port for invite persistence.
#[async_trait]
pub trait InviteRepository: Send + Sync {
    /// Stores a new pending invite. Fails with `Conflict` when the email is
    /// already invited to the same event.
    async fn create_invite(&self, event_id: EventId, invitee: &Invitee) -> AppResult<Invite>;

    /// Finds an invite by id.
    async fn find_invite(&self, invite_id: InviteId) -> AppResult<Option<Invite>>;

    /// Lists invites of an event ordered by id.
    async fn list_invites_for_event(&self, event_id: EventId) -> AppResult<Vec<Invite>>;

    /// Deletes an invite. Returns `false` if it did not exist.
    async fn delete_invite(&self, invite_id: InviteId) -> AppResult<bool>;

    /// Sets `coming = true` only if it is still false.
    ///
    /// Returns `true` when this call performed the transition.
    async fn mark_confirmed(&self, invite_id: InviteId) -> AppResult<bool>;

    /// Lists invites with `reminder_sent = false` whose event date lies in
    /// `[from, until]`, ordered by event date then invite id.
    async fn list_due_reminders(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> AppResult<Vec<DueReminder>>;

    /// Sets `reminder_sent = true` only if it is still false.
    ///
    /// Returns `true` when this call performed the transition.
    async fn mark_reminder_sent(&self, invite_id: InviteId) -> AppResult<bool>;
}

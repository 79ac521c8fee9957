//! In-memory implementation of the event, invite and user ports.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use kinboard_application::{
    DueReminder, EventRepository, InviteRepository, UserRecord, UserRepository,
};
use kinboard_core::{AppError, AppResult};
use kinboard_domain::{
    ConfirmationOutcome, Event, EventDetails, EventId, Invite, InviteId, Invitee, UserId,
};

#[derive(Debug, Default)]
struct Records {
    next_event_id: i64,
    next_invite_id: i64,
    events: BTreeMap<EventId, Event>,
    invites: BTreeMap<InviteId, Invite>,
}

/// In-memory repository, primarily for tests and local experiments.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    records: RwLock<Records>,
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for InMemoryRepository {
    async fn create_event(&self, owner_id: UserId, details: &EventDetails) -> AppResult<Event> {
        let mut records = self.records.write().await;
        records.next_event_id += 1;
        let event = Event::new(
            EventId::new(records.next_event_id),
            owner_id,
            details.clone(),
        );
        records.events.insert(event.id(), event.clone());
        Ok(event)
    }

    async fn find_event(&self, event_id: EventId) -> AppResult<Option<Event>> {
        Ok(self.records.read().await.events.get(&event_id).cloned())
    }

    async fn list_events_for_owner(&self, owner_id: UserId) -> AppResult<Vec<Event>> {
        let records = self.records.read().await;
        let mut events: Vec<Event> = records
            .events
            .values()
            .filter(|event| event.is_owned_by(owner_id))
            .cloned()
            .collect();
        events.sort_by_key(|event| (event.details().date(), event.details().time(), event.id()));
        Ok(events)
    }

    async fn update_event(&self, event_id: EventId, details: &EventDetails) -> AppResult<Event> {
        let mut records = self.records.write().await;
        let Some(existing) = records.events.get(&event_id) else {
            return Err(AppError::NotFound(format!(
                "event '{event_id}' does not exist"
            )));
        };

        let updated = Event::new(event_id, existing.owner_id(), details.clone());
        records.events.insert(event_id, updated.clone());
        Ok(updated)
    }

    async fn delete_event(&self, event_id: EventId) -> AppResult<bool> {
        let mut records = self.records.write().await;
        records.invites.retain(|_, invite| !invite.belongs_to(event_id));
        Ok(records.events.remove(&event_id).is_some())
    }
}

#[async_trait]
impl InviteRepository for InMemoryRepository {
    async fn create_invite(&self, event_id: EventId, invitee: &Invitee) -> AppResult<Invite> {
        let mut records = self.records.write().await;
        if !records.events.contains_key(&event_id) {
            return Err(AppError::NotFound(format!(
                "event '{event_id}' does not exist"
            )));
        }

        if records.invites.values().any(|invite| {
            invite.belongs_to(event_id) && invite.invitee().email() == invitee.email()
        }) {
            return Err(AppError::Conflict(format!(
                "'{}' is already invited to event '{event_id}'",
                invitee.email()
            )));
        }

        records.next_invite_id += 1;
        let invite = Invite::new(
            InviteId::new(records.next_invite_id),
            event_id,
            invitee.clone(),
            false,
            false,
        );
        records.invites.insert(invite.id(), invite.clone());
        Ok(invite)
    }

    async fn find_invite(&self, invite_id: InviteId) -> AppResult<Option<Invite>> {
        Ok(self.records.read().await.invites.get(&invite_id).cloned())
    }

    async fn list_invites_for_event(&self, event_id: EventId) -> AppResult<Vec<Invite>> {
        Ok(self
            .records
            .read()
            .await
            .invites
            .values()
            .filter(|invite| invite.belongs_to(event_id))
            .cloned()
            .collect())
    }

    async fn delete_invite(&self, invite_id: InviteId) -> AppResult<bool> {
        Ok(self
            .records
            .write()
            .await
            .invites
            .remove(&invite_id)
            .is_some())
    }

    async fn mark_confirmed(&self, invite_id: InviteId) -> AppResult<bool> {
        let mut records = self.records.write().await;
        Ok(records
            .invites
            .get_mut(&invite_id)
            .is_some_and(|invite| invite.confirm() == ConfirmationOutcome::Confirmed))
    }

    async fn list_due_reminders(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> AppResult<Vec<DueReminder>> {
        let records = self.records.read().await;
        let mut due: Vec<DueReminder> = records
            .invites
            .values()
            .filter(|invite| !invite.reminder_sent())
            .filter_map(|invite| {
                let event = records.events.get(&invite.event_id())?;
                let date = event.details().date();
                (from <= date && date <= until).then(|| DueReminder {
                    invite: invite.clone(),
                    event: event.clone(),
                })
            })
            .collect();
        due.sort_by_key(|reminder| (reminder.event.details().date(), reminder.invite.id()));
        Ok(due)
    }

    async fn mark_reminder_sent(&self, invite_id: InviteId) -> AppResult<bool> {
        let mut records = self.records.write().await;
        Ok(records
            .invites
            .get_mut(&invite_id)
            .is_some_and(Invite::mark_reminder_sent))
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        Ok(self
            .users
            .read()
            .await
            .get(email.to_lowercase().as_str())
            .cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.id == user_id)
            .cloned())
    }

    async fn create(
        &self,
        email: &str,
        display_name: &str,
        password_hash: &str,
    ) -> AppResult<UserRecord> {
        let key = email.to_lowercase();
        let mut users = self.users.write().await;
        if users.contains_key(&key) {
            return Err(AppError::Conflict(
                "an account with this email already exists".to_owned(),
            ));
        }

        let user = UserRecord {
            id: UserId::new(),
            email: key.clone(),
            display_name: display_name.to_owned(),
            password_hash: password_hash.to_owned(),
        };
        users.insert(key, user.clone());
        Ok(user)
    }
}

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use kinboard_core::{AppError, AppResult};
use kinboard_domain::{Event, EventDetails, EventId, Invite, InviteId, Invitee, UserId};

use crate::{
    ConfirmationTokenService, DueReminder, EmailService, EventRepository, InviteMailer,
    InviteRepository, PasswordHasher, TokenSettings, UserRecord, UserRepository,
};

pub(crate) const TEST_SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

fn lock<T>(mutex: &Mutex<T>) -> AppResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|error| AppError::Internal(format!("failed to lock test state: {error}")))
}

#[derive(Default)]
struct StoreState {
    next_event_id: i64,
    next_invite_id: i64,
    events: BTreeMap<EventId, Event>,
    invites: BTreeMap<InviteId, Invite>,
}

/// Event and invite fake backed by ordered maps.
#[derive(Default)]
pub(crate) struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    /// Inserts an event with a fixed id.
    pub(crate) fn seed_event(&self, event_id: i64, owner_id: UserId, date: NaiveDate) -> Event {
        let details = EventDetails::new(
            format!("Event {event_id}"),
            date,
            NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default(),
            "Town hall",
        )
        .unwrap_or_else(|_| unreachable!());
        let event = Event::new(EventId::new(event_id), owner_id, details);

        if let Ok(mut state) = lock(&self.state) {
            state.next_event_id = state.next_event_id.max(event_id);
            state.events.insert(event.id(), event.clone());
        }

        event
    }

    /// Inserts a pending, not reminded invite with a fixed id.
    pub(crate) fn seed_invite(&self, invite_id: i64, event_id: i64, email: &str) -> Invite {
        let invitee = Invitee::new(format!("Guest {invite_id}"), email)
            .unwrap_or_else(|_| unreachable!());
        let invite = Invite::new(
            InviteId::new(invite_id),
            EventId::new(event_id),
            invitee,
            false,
            false,
        );

        if let Ok(mut state) = lock(&self.state) {
            state.next_invite_id = state.next_invite_id.max(invite_id);
            state.invites.insert(invite.id(), invite.clone());
        }

        invite
    }

    /// Returns a snapshot of an invite.
    pub(crate) fn invite(&self, invite_id: i64) -> Option<Invite> {
        lock(&self.state)
            .ok()
            .and_then(|state| state.invites.get(&InviteId::new(invite_id)).cloned())
    }
}

#[async_trait]
impl EventRepository for InMemoryStore {
    async fn create_event(&self, owner_id: UserId, details: &EventDetails) -> AppResult<Event> {
        let mut state = lock(&self.state)?;
        state.next_event_id += 1;
        let event = Event::new(EventId::new(state.next_event_id), owner_id, details.clone());
        state.events.insert(event.id(), event.clone());
        Ok(event)
    }

    async fn find_event(&self, event_id: EventId) -> AppResult<Option<Event>> {
        Ok(lock(&self.state)?.events.get(&event_id).cloned())
    }

    async fn list_events_for_owner(&self, owner_id: UserId) -> AppResult<Vec<Event>> {
        Ok(lock(&self.state)?
            .events
            .values()
            .filter(|event| event.is_owned_by(owner_id))
            .cloned()
            .collect())
    }

    async fn update_event(&self, event_id: EventId, details: &EventDetails) -> AppResult<Event> {
        let mut state = lock(&self.state)?;
        let existing = state
            .events
            .get(&event_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("event '{event_id}' does not exist")))?;
        let updated = Event::new(event_id, existing.owner_id(), details.clone());
        state.events.insert(event_id, updated.clone());
        Ok(updated)
    }

    async fn delete_event(&self, event_id: EventId) -> AppResult<bool> {
        let mut state = lock(&self.state)?;
        state.invites.retain(|_, invite| invite.event_id() != event_id);
        Ok(state.events.remove(&event_id).is_some())
    }
}

#[async_trait]
impl InviteRepository for InMemoryStore {
    async fn create_invite(&self, event_id: EventId, invitee: &Invitee) -> AppResult<Invite> {
        let mut state = lock(&self.state)?;
        let duplicate = state.invites.values().any(|invite| {
            invite.event_id() == event_id && invite.invitee().email() == invitee.email()
        });
        if duplicate {
            return Err(AppError::Conflict(format!(
                "'{}' is already invited to event '{event_id}'",
                invitee.email()
            )));
        }

        state.next_invite_id += 1;
        let invite = Invite::new(
            InviteId::new(state.next_invite_id),
            event_id,
            invitee.clone(),
            false,
            false,
        );
        state.invites.insert(invite.id(), invite.clone());
        Ok(invite)
    }

    async fn find_invite(&self, invite_id: InviteId) -> AppResult<Option<Invite>> {
        Ok(lock(&self.state)?.invites.get(&invite_id).cloned())
    }

    async fn list_invites_for_event(&self, event_id: EventId) -> AppResult<Vec<Invite>> {
        Ok(lock(&self.state)?
            .invites
            .values()
            .filter(|invite| invite.belongs_to(event_id))
            .cloned()
            .collect())
    }

    async fn delete_invite(&self, invite_id: InviteId) -> AppResult<bool> {
        Ok(lock(&self.state)?.invites.remove(&invite_id).is_some())
    }

    async fn mark_confirmed(&self, invite_id: InviteId) -> AppResult<bool> {
        let mut state = lock(&self.state)?;
        let Some(invite) = state.invites.get_mut(&invite_id) else {
            return Ok(false);
        };

        Ok(invite.confirm() == kinboard_domain::ConfirmationOutcome::Confirmed)
    }

    async fn list_due_reminders(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> AppResult<Vec<DueReminder>> {
        let state = lock(&self.state)?;
        Ok(state
            .invites
            .values()
            .filter(|invite| !invite.reminder_sent())
            .filter_map(|invite| {
                let event = state.events.get(&invite.event_id())?;
                let date = event.details().date();
                (date >= from && date <= until).then(|| DueReminder {
                    invite: invite.clone(),
                    event: event.clone(),
                })
            })
            .collect())
    }

    async fn mark_reminder_sent(&self, invite_id: InviteId) -> AppResult<bool> {
        let mut state = lock(&self.state)?;
        Ok(state
            .invites
            .get_mut(&invite_id)
            .is_some_and(Invite::mark_reminder_sent))
    }
}

/// Email fake that records messages and can refuse specific recipients.
#[derive(Default)]
pub(crate) struct RecordingEmailService {
    sent: Mutex<Vec<SentEmail>>,
    failing_recipients: Mutex<HashSet<String>>,
}

#[derive(Debug, Clone)]
pub(crate) struct SentEmail {
    pub(crate) to: String,
    pub(crate) subject: String,
    pub(crate) text_body: String,
    pub(crate) html_body: Option<String>,
}

impl RecordingEmailService {
    pub(crate) fn fail_for(&self, recipient: &str) {
        if let Ok(mut failing) = lock(&self.failing_recipients) {
            failing.insert(recipient.to_owned());
        }
    }

    pub(crate) fn recover(&self, recipient: &str) {
        if let Ok(mut failing) = lock(&self.failing_recipients) {
            failing.remove(recipient);
        }
    }

    pub(crate) fn sent(&self) -> Vec<SentEmail> {
        lock(&self.sent).map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EmailService for RecordingEmailService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> AppResult<()> {
        if lock(&self.failing_recipients)?.contains(to) {
            return Err(AppError::Delivery(format!("mailbox '{to}' unavailable")));
        }

        lock(&self.sent)?.push(SentEmail {
            to: to.to_owned(),
            subject: subject.to_owned(),
            text_body: text_body.to_owned(),
            html_body: html_body.map(str::to_owned),
        });
        Ok(())
    }
}

/// User fake keyed by canonical email.
#[derive(Default)]
pub(crate) struct FakeUserRepository {
    users: Mutex<HashMap<String, UserRecord>>,
}

#[async_trait]
impl UserRepository for FakeUserRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        Ok(lock(&self.users)?.get(email).cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(lock(&self.users)?
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
        let record = UserRecord {
            id: UserId::new(),
            email: email.to_owned(),
            display_name: display_name.to_owned(),
            password_hash: password_hash.to_owned(),
        };
        lock(&self.users)?.insert(email.to_owned(), record.clone());
        Ok(record)
    }
}

/// Reversible stand-in for Argon2 so tests stay fast.
pub(crate) struct PlainPasswordHasher;

#[async_trait]
impl PasswordHasher for PlainPasswordHasher {
    async fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(format!("plain:{password}"))
    }

    async fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(hash == format!("plain:{password}"))
    }
}

pub(crate) fn token_service() -> ConfirmationTokenService {
    ConfirmationTokenService::new(
        TokenSettings::new(TEST_SECRET, "kinboard").unwrap_or_else(|_| unreachable!()),
    )
}

pub(crate) fn mailer(email_service: Arc<RecordingEmailService>) -> InviteMailer {
    InviteMailer::new(email_service, token_service(), "https://kinboard.test")
        .unwrap_or_else(|_| unreachable!())
}

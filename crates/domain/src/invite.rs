//! Invites and their confirmation/reminder lifecycle.

use kinboard_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::{EmailAddress, EventId};

/// Database-assigned identifier of an invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InviteId(i64);

impl InviteId {
    /// Wraps a persisted identifier.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for InviteId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Person being invited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitee {
    name: NonEmptyString,
    email: EmailAddress,
}

impl Invitee {
    /// Validates invitee name and email.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> AppResult<Self> {
        let name = NonEmptyString::new(name)?;
        if name.as_str().chars().count() > 200 {
            return Err(AppError::Validation(
                "invitee name must not exceed 200 characters".to_owned(),
            ));
        }

        Ok(Self {
            name,
            email: EmailAddress::new(email)?,
        })
    }

    /// Invitee display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Canonical invitee email.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }
}

/// Attendance state of an invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    /// Invite sent, not confirmed yet.
    Pending,
    /// Invitee confirmed attendance. Terminal.
    Confirmed,
}

/// Result of applying a confirmation to an invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationOutcome {
    /// The invite moved from pending to confirmed.
    Confirmed,
    /// The invite was confirmed earlier; nothing changed.
    AlreadyConfirmed,
}

/// Persisted invite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invite {
    id: InviteId,
    event_id: EventId,
    invitee: Invitee,
    coming: bool,
    reminder_sent: bool,
}

impl Invite {
    /// Assembles an invite from its persisted parts.
    #[must_use]
    pub fn new(
        id: InviteId,
        event_id: EventId,
        invitee: Invitee,
        coming: bool,
        reminder_sent: bool,
    ) -> Self {
        Self {
            id,
            event_id,
            invitee,
            coming,
            reminder_sent,
        }
    }

    /// Invite identifier.
    #[must_use]
    pub fn id(&self) -> InviteId {
        self.id
    }

    /// Event the invite belongs to.
    #[must_use]
    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    /// Invited person.
    #[must_use]
    pub fn invitee(&self) -> &Invitee {
        &self.invitee
    }

    /// Whether the invitee confirmed attendance.
    #[must_use]
    pub fn is_coming(&self) -> bool {
        self.coming
    }

    /// Whether the reminder mail has been delivered.
    #[must_use]
    pub fn reminder_sent(&self) -> bool {
        self.reminder_sent
    }

    /// Current attendance state.
    #[must_use]
    pub fn status(&self) -> InviteStatus {
        if self.coming {
            InviteStatus::Confirmed
        } else {
            InviteStatus::Pending
        }
    }

    /// Returns `true` when the invite is attached to `event_id`.
    #[must_use]
    pub fn belongs_to(&self, event_id: EventId) -> bool {
        self.event_id == event_id
    }

    /// Applies a confirmation. Idempotent: a confirmed invite stays confirmed.
    pub fn confirm(&mut self) -> ConfirmationOutcome {
        if self.coming {
            return ConfirmationOutcome::AlreadyConfirmed;
        }

        self.coming = true;
        ConfirmationOutcome::Confirmed
    }

    /// Records that the reminder went out. Returns `false` if it already had.
    pub fn mark_reminder_sent(&mut self) -> bool {
        if self.reminder_sent {
            return false;
        }

        self.reminder_sent = true;
        true
    }
}

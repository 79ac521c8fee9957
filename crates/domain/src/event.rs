//! Family events owned by a single user.

use chrono::{Days, NaiveDate, NaiveTime};
use kinboard_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// Database-assigned identifier of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(i64);

impl EventId {
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

impl std::fmt::Display for EventId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated, owner-editable part of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetails {
    name: NonEmptyString,
    date: NaiveDate,
    time: NaiveTime,
    location: String,
}

impl EventDetails {
    /// Validates and builds event details.
    pub fn new(
        name: impl Into<String>,
        date: NaiveDate,
        time: NaiveTime,
        location: impl Into<String>,
    ) -> AppResult<Self> {
        let name = NonEmptyString::new(name)?;
        if name.as_str().chars().count() > 200 {
            return Err(AppError::Validation(
                "event name must not exceed 200 characters".to_owned(),
            ));
        }

        let location = location.into().trim().to_owned();
        if location.chars().count() > 300 {
            return Err(AppError::Validation(
                "event location must not exceed 300 characters".to_owned(),
            ));
        }

        Ok(Self {
            name,
            date,
            time,
            location,
        })
    }

    /// Event title.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Calendar date the event takes place on.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Local start time.
    #[must_use]
    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// Free-form location, possibly empty.
    #[must_use]
    pub fn location(&self) -> &str {
        self.location.as_str()
    }
}

/// Persisted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    id: EventId,
    owner_id: UserId,
    details: EventDetails,
}

impl Event {
    /// Assembles an event from its persisted parts.
    #[must_use]
    pub fn new(id: EventId, owner_id: UserId, details: EventDetails) -> Self {
        Self {
            id,
            owner_id,
            details,
        }
    }

    /// Event identifier.
    #[must_use]
    pub fn id(&self) -> EventId {
        self.id
    }

    /// Owning user.
    #[must_use]
    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    /// Editable details.
    #[must_use]
    pub fn details(&self) -> &EventDetails {
        &self.details
    }

    /// Returns `true` when `user_id` owns this event.
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }

    /// Returns `true` when the event falls on `today` or within the next
    /// `window_days` days.
    #[must_use]
    pub fn is_within_reminder_window(&self, today: NaiveDate, window_days: u32) -> bool {
        let Some(horizon) = today.checked_add_days(Days::new(u64::from(window_days))) else {
            return false;
        };

        self.details.date >= today && self.details.date <= horizon
    }
}

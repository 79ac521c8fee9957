//! One pass of the reminder job.
//!
//! The scheduler in the API process calls [`ReminderService::run_once`] on a
//! fixed interval. A pass selects every invite whose reminder is still
//! outstanding and whose event falls within the reminder window, mails it and
//! records the reminder. A failing invite is logged and skipped so the rest
//! of the batch still goes out; it stays selectable for the next pass.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use tracing::{debug, info, warn};

use kinboard_core::AppResult;

use crate::{DueReminder, InviteMailer, InviteRepository};

/// Number of days ahead of an event at which reminders go out.
pub const DEFAULT_REMINDER_WINDOW_DAYS: u32 = 3;

/// Counters for a single reminder pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderRunSummary {
    /// Invites selected as due.
    pub due: usize,
    /// Reminders delivered and recorded.
    pub sent: usize,
    /// Reminders that failed and will be retried next pass.
    pub failed: usize,
}

/// Selects due invites and sends their reminders.
#[derive(Clone)]
pub struct ReminderService {
    invite_repository: Arc<dyn InviteRepository>,
    mailer: InviteMailer,
    window_days: u32,
}

impl ReminderService {
    /// Creates a reminder service with a window of `window_days` days.
    #[must_use]
    pub fn new(
        invite_repository: Arc<dyn InviteRepository>,
        mailer: InviteMailer,
        window_days: u32,
    ) -> Self {
        Self {
            invite_repository,
            mailer,
            window_days,
        }
    }

    /// Runs one reminder pass for events dated between `today` and
    /// `today + window_days`, both inclusive.
    ///
    /// Only a failure to load the due invites aborts the pass.
    pub async fn run_once(&self, today: NaiveDate) -> AppResult<ReminderRunSummary> {
        let until = today
            .checked_add_days(Days::new(u64::from(self.window_days)))
            .unwrap_or(NaiveDate::MAX);
        let due = self
            .invite_repository
            .list_due_reminders(today, until)
            .await?;

        let mut summary = ReminderRunSummary {
            due: due.len(),
            ..ReminderRunSummary::default()
        };

        for reminder in &due {
            match self.remind(reminder).await {
                Ok(true) => summary.sent += 1,
                Ok(false) => {}
                Err(error) => {
                    summary.failed += 1;
                    warn!(
                        error = %error,
                        invite_id = %reminder.invite.id(),
                        event_id = %reminder.event.id(),
                        "failed to send invite reminder"
                    );
                }
            }
        }

        if summary.due > 0 {
            info!(
                due = summary.due,
                sent = summary.sent,
                failed = summary.failed,
                "reminder pass finished"
            );
        } else {
            debug!("reminder pass found nothing due");
        }

        Ok(summary)
    }

    async fn remind(&self, reminder: &DueReminder) -> AppResult<bool> {
        self.mailer
            .send_reminder(&reminder.invite, &reminder.event)
            .await?;

        let recorded = self
            .invite_repository
            .mark_reminder_sent(reminder.invite.id())
            .await?;
        if !recorded {
            debug!(
                invite_id = %reminder.invite.id(),
                "reminder was already recorded by another pass"
            );
        }

        Ok(recorded)
    }
}

//! PostgreSQL-backed invite repository.
//!
//! State transitions are single conditional `UPDATE`s so concurrent
//! confirmations and overlapping reminder passes cannot both win.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{FromRow, PgPool};

use kinboard_application::{DueReminder, InviteRepository};
use kinboard_core::{AppError, AppResult};
use kinboard_domain::{Event, EventId, Invite, InviteId, Invitee};

use crate::postgres_event_repository::EventRow;

#[cfg(test)]
mod tests;

/// PostgreSQL implementation of the invite repository port.
#[derive(Clone)]
pub struct PostgresInviteRepository {
    pool: PgPool,
}

impl PostgresInviteRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct InviteRow {
    id: i64,
    event_id: i64,
    name: String,
    email: String,
    coming: bool,
    reminder_sent: bool,
}

impl TryFrom<InviteRow> for Invite {
    type Error = AppError;

    fn try_from(row: InviteRow) -> AppResult<Self> {
        let invitee = Invitee::new(row.name, row.email).map_err(|error| {
            AppError::Internal(format!("stored invite '{}' is invalid: {error}", row.id))
        })?;

        Ok(Invite::new(
            InviteId::new(row.id),
            EventId::new(row.event_id),
            invitee,
            row.coming,
            row.reminder_sent,
        ))
    }
}

#[derive(Debug, FromRow)]
struct DueReminderRow {
    invite_id: i64,
    invitee_name: String,
    invitee_email: String,
    coming: bool,
    reminder_sent: bool,
    event_id: i64,
    owner_id: uuid::Uuid,
    event_name: String,
    event_date: NaiveDate,
    event_time: NaiveTime,
    location: String,
}

impl TryFrom<DueReminderRow> for DueReminder {
    type Error = AppError;

    fn try_from(row: DueReminderRow) -> AppResult<Self> {
        let invite = Invite::try_from(InviteRow {
            id: row.invite_id,
            event_id: row.event_id,
            name: row.invitee_name,
            email: row.invitee_email,
            coming: row.coming,
            reminder_sent: row.reminder_sent,
        })?;
        let event = Event::try_from(EventRow {
            id: row.event_id,
            owner_id: row.owner_id,
            name: row.event_name,
            event_date: row.event_date,
            event_time: row.event_time,
            location: row.location,
        })?;

        Ok(DueReminder { invite, event })
    }
}

#[async_trait]
impl InviteRepository for PostgresInviteRepository {
    async fn create_invite(&self, event_id: EventId, invitee: &Invitee) -> AppResult<Invite> {
        let row = sqlx::query_as::<_, InviteRow>(
            r#"
            INSERT INTO invites (event_id, name, email)
            VALUES ($1, $2, $3)
            RETURNING id, event_id, name, email, coming, reminder_sent
            "#,
        )
        .bind(event_id.value())
        .bind(invitee.name())
        .bind(invitee.email().as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_create_error(error, event_id, invitee))?;

        Invite::try_from(row)
    }

    async fn find_invite(&self, invite_id: InviteId) -> AppResult<Option<Invite>> {
        let row = sqlx::query_as::<_, InviteRow>(
            r#"
            SELECT id, event_id, name, email, coming, reminder_sent
            FROM invites
            WHERE id = $1
            "#,
        )
        .bind(invite_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find invite: {error}")))?;

        row.map(Invite::try_from).transpose()
    }

    async fn list_invites_for_event(&self, event_id: EventId) -> AppResult<Vec<Invite>> {
        let rows = sqlx::query_as::<_, InviteRow>(
            r#"
            SELECT id, event_id, name, email, coming, reminder_sent
            FROM invites
            WHERE event_id = $1
            ORDER BY id
            "#,
        )
        .bind(event_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list invites: {error}")))?;

        rows.into_iter().map(Invite::try_from).collect()
    }

    async fn delete_invite(&self, invite_id: InviteId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM invites WHERE id = $1")
            .bind(invite_id.value())
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete invite: {error}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_confirmed(&self, invite_id: InviteId) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE invites
            SET coming = TRUE, updated_at = now()
            WHERE id = $1 AND coming = FALSE
            "#,
        )
        .bind(invite_id.value())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to confirm invite: {error}")))?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_due_reminders(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> AppResult<Vec<DueReminder>> {
        let rows = sqlx::query_as::<_, DueReminderRow>(
            r#"
            SELECT i.id AS invite_id,
                   i.name AS invitee_name,
                   i.email AS invitee_email,
                   i.coming,
                   i.reminder_sent,
                   e.id AS event_id,
                   e.owner_id,
                   e.name AS event_name,
                   e.event_date,
                   e.event_time,
                   e.location
            FROM invites i
            INNER JOIN events e ON e.id = i.event_id
            WHERE i.reminder_sent = FALSE
              AND e.event_date BETWEEN $1 AND $2
            ORDER BY e.event_date, i.id
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list due reminders: {error}")))?;

        rows.into_iter().map(DueReminder::try_from).collect()
    }

    async fn mark_reminder_sent(&self, invite_id: InviteId) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE invites
            SET reminder_sent = TRUE, updated_at = now()
            WHERE id = $1 AND reminder_sent = FALSE
            "#,
        )
        .bind(invite_id.value())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to record reminder: {error}")))?;

        Ok(result.rows_affected() == 1)
    }
}

fn map_create_error(error: sqlx::Error, event_id: EventId, invitee: &Invitee) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error {
        if database_error.is_unique_violation() {
            return AppError::Conflict(format!(
                "'{}' is already invited to event '{event_id}'",
                invitee.email()
            ));
        }
        if database_error.is_foreign_key_violation() {
            return AppError::NotFound(format!("event '{event_id}' does not exist"));
        }
    }

    AppError::Internal(format!("failed to create invite: {error}"))
}

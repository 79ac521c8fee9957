//! PostgreSQL-backed event repository.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{FromRow, PgPool};

use kinboard_application::EventRepository;
use kinboard_core::{AppError, AppResult};
use kinboard_domain::{Event, EventDetails, EventId, UserId};

/// PostgreSQL implementation of the event repository port.
#[derive(Clone)]
pub struct PostgresEventRepository {
    pool: PgPool,
}

impl PostgresEventRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct EventRow {
    pub(crate) id: i64,
    pub(crate) owner_id: uuid::Uuid,
    pub(crate) name: String,
    pub(crate) event_date: NaiveDate,
    pub(crate) event_time: NaiveTime,
    pub(crate) location: String,
}

impl TryFrom<EventRow> for Event {
    type Error = AppError;

    fn try_from(row: EventRow) -> AppResult<Self> {
        let details = EventDetails::new(row.name, row.event_date, row.event_time, row.location)
            .map_err(|error| {
                AppError::Internal(format!("stored event '{}' is invalid: {error}", row.id))
            })?;

        Ok(Event::new(
            EventId::new(row.id),
            UserId::from_uuid(row.owner_id),
            details,
        ))
    }
}

#[async_trait]
impl EventRepository for PostgresEventRepository {
    async fn create_event(&self, owner_id: UserId, details: &EventDetails) -> AppResult<Event> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            INSERT INTO events (owner_id, name, event_date, event_time, location)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, owner_id, name, event_date, event_time, location
            "#,
        )
        .bind(owner_id.as_uuid())
        .bind(details.name())
        .bind(details.date())
        .bind(details.time())
        .bind(details.location())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create event: {error}")))?;

        Event::try_from(row)
    }

    async fn find_event(&self, event_id: EventId) -> AppResult<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, owner_id, name, event_date, event_time, location
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(event_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find event: {error}")))?;

        row.map(Event::try_from).transpose()
    }

    async fn list_events_for_owner(&self, owner_id: UserId) -> AppResult<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, owner_id, name, event_date, event_time, location
            FROM events
            WHERE owner_id = $1
            ORDER BY event_date, event_time, id
            "#,
        )
        .bind(owner_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list events: {error}")))?;

        rows.into_iter().map(Event::try_from).collect()
    }

    async fn update_event(&self, event_id: EventId, details: &EventDetails) -> AppResult<Event> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            UPDATE events
            SET name = $2, event_date = $3, event_time = $4, location = $5, updated_at = now()
            WHERE id = $1
            RETURNING id, owner_id, name, event_date, event_time, location
            "#,
        )
        .bind(event_id.value())
        .bind(details.name())
        .bind(details.date())
        .bind(details.time())
        .bind(details.location())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update event: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("event '{event_id}' does not exist")))?;

        Event::try_from(row)
    }

    async fn delete_event(&self, event_id: EventId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(event_id.value())
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete event: {error}")))?;

        Ok(result.rows_affected() > 0)
    }
}

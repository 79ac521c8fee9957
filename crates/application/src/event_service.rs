//! Event ports and application service.
//!
//! Every operation receives the caller's resolved user id. Events owned by
//! somebody else are reported as not found so their existence is not leaked.

use std::sync::Arc;

use async_trait::async_trait;

use kinboard_core::{AppError, AppResult};
use kinboard_domain::{Event, EventDetails, EventId, UserId};

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Repository port for event persistence.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Stores a new event and returns it with its assigned id.
    async fn create_event(&self, owner_id: UserId, details: &EventDetails) -> AppResult<Event>;

    /// Finds an event by id regardless of owner.
    async fn find_event(&self, event_id: EventId) -> AppResult<Option<Event>>;

    /// Lists events of an owner ordered by date, time, then id.
    async fn list_events_for_owner(&self, owner_id: UserId) -> AppResult<Vec<Event>>;

    /// Replaces the editable details of an event.
    async fn update_event(&self, event_id: EventId, details: &EventDetails) -> AppResult<Event>;

    /// Deletes an event together with its invites. Returns `false` if it did
    /// not exist.
    async fn delete_event(&self, event_id: EventId) -> AppResult<bool>;
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Application service for owner-scoped event management.
#[derive(Clone)]
pub struct EventService {
    event_repository: Arc<dyn EventRepository>,
}

impl EventService {
    /// Creates a new event service.
    #[must_use]
    pub fn new(event_repository: Arc<dyn EventRepository>) -> Self {
        Self { event_repository }
    }

    /// Creates an event owned by `owner_id`.
    pub async fn create_event(&self, owner_id: UserId, details: EventDetails) -> AppResult<Event> {
        self.event_repository.create_event(owner_id, &details).await
    }

    /// Lists the caller's events.
    pub async fn list_events(&self, owner_id: UserId) -> AppResult<Vec<Event>> {
        self.event_repository.list_events_for_owner(owner_id).await
    }

    /// Returns one of the caller's events.
    pub async fn get_event(&self, owner_id: UserId, event_id: EventId) -> AppResult<Event> {
        load_owned_event(self.event_repository.as_ref(), owner_id, event_id).await
    }

    /// Replaces the details of one of the caller's events.
    pub async fn update_event(
        &self,
        owner_id: UserId,
        event_id: EventId,
        details: EventDetails,
    ) -> AppResult<Event> {
        load_owned_event(self.event_repository.as_ref(), owner_id, event_id).await?;
        self.event_repository.update_event(event_id, &details).await
    }

    /// Deletes one of the caller's events and its invites.
    pub async fn delete_event(&self, owner_id: UserId, event_id: EventId) -> AppResult<()> {
        load_owned_event(self.event_repository.as_ref(), owner_id, event_id).await?;

        if !self.event_repository.delete_event(event_id).await? {
            return Err(event_not_found(event_id));
        }

        Ok(())
    }
}

/// Loads an event and checks that `owner_id` owns it.
pub(crate) async fn load_owned_event(
    repository: &dyn EventRepository,
    owner_id: UserId,
    event_id: EventId,
) -> AppResult<Event> {
    let event = repository
        .find_event(event_id)
        .await?
        .filter(|event| event.is_owned_by(owner_id))
        .ok_or_else(|| event_not_found(event_id))?;

    Ok(event)
}

fn event_not_found(event_id: EventId) -> AppError {
    AppError::NotFound(format!("event '{event_id}' does not exist"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{NaiveDate, NaiveTime};
    use kinboard_core::AppError;
    use kinboard_domain::{EventDetails, UserId};

    use super::EventService;
    use crate::test_support::InMemoryStore;

    fn details(name: &str) -> EventDetails {
        EventDetails::new(
            name,
            NaiveDate::from_ymd_opt(2026, 12, 24).unwrap_or_default(),
            NaiveTime::from_hms_opt(19, 30, 0).unwrap_or_default(),
            "Home",
        )
        .unwrap_or_else(|_| unreachable!())
    }

    #[tokio::test]
    async fn events_are_scoped_to_their_owner() {
        let store = Arc::new(InMemoryStore::default());
        let service = EventService::new(store.clone());
        let owner = UserId::new();
        let stranger = UserId::new();

        let created = service.create_event(owner, details("Christmas Eve")).await;
        assert!(created.is_ok());
        let created = created.unwrap_or_else(|_| unreachable!());

        assert!(service.get_event(owner, created.id()).await.is_ok());
        assert!(matches!(
            service.get_event(stranger, created.id()).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(
            service.list_events(stranger).await.map(|events| events.len()).ok(),
            Some(0)
        );
    }

    #[tokio::test]
    async fn stranger_cannot_update_or_delete() {
        let store = Arc::new(InMemoryStore::default());
        let service = EventService::new(store.clone());
        let owner = UserId::new();
        let stranger = UserId::new();
        let created = service
            .create_event(owner, details("Dinner"))
            .await
            .unwrap_or_else(|_| unreachable!());

        assert!(matches!(
            service
                .update_event(stranger, created.id(), details("Hijacked"))
                .await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_event(stranger, created.id()).await,
            Err(AppError::NotFound(_))
        ));

        let updated = service
            .update_event(owner, created.id(), details("Family dinner"))
            .await;
        assert_eq!(
            updated.ok().map(|event| event.details().name().to_owned()),
            Some("Family dinner".to_owned())
        );

        assert!(service.delete_event(owner, created.id()).await.is_ok());
        assert!(matches!(
            service.get_event(owner, created.id()).await,
            Err(AppError::NotFound(_))
        ));
    }
}

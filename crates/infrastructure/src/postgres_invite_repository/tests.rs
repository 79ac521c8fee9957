use chrono::{Days, NaiveDate, NaiveTime};
use kinboard_application::{EventRepository, InviteRepository, UserRepository};
use kinboard_core::AppError;
use kinboard_domain::{EventDetails, Invitee, UserId};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::PostgresInviteRepository;
use crate::{PostgresEventRepository, PostgresUserRepository};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres invite tests: {error}");
    }

    Some(pool)
}

async fn seed_owner(pool: &PgPool) -> UserId {
    let repository = PostgresUserRepository::new(pool.clone());
    let email = format!("owner-{}@example.com", Uuid::new_v4());
    let created = repository.create(email.as_str(), "Owner", "hash").await;
    assert!(created.is_ok());
    created.map(|user| user.id).unwrap_or_default()
}

fn details(date: NaiveDate) -> EventDetails {
    EventDetails::new(
        "Sunday lunch",
        date,
        NaiveTime::from_hms_opt(12, 30, 0).unwrap_or_default(),
        "Grandma's",
    )
    .unwrap_or_else(|_| unreachable!())
}

// The shared database may hold rows from other runs, so every assertion on
// due reminders filters by the event created in the test.
fn far_future(offset: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2990, 1, 1)
        .and_then(|date| date.checked_add_days(Days::new(offset)))
        .unwrap_or_default()
}

#[tokio::test]
async fn confirm_and_reminder_transitions_happen_once() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let owner = seed_owner(&pool).await;
    let events = PostgresEventRepository::new(pool.clone());
    let invites = PostgresInviteRepository::new(pool.clone());
    let event = events
        .create_event(owner, &details(far_future(2)))
        .await
        .unwrap_or_else(|_| unreachable!());
    let invitee = Invitee::new("Ada", "ada@example.com").unwrap_or_else(|_| unreachable!());
    let invite = invites
        .create_invite(event.id(), &invitee)
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(!invite.is_coming());
    assert_eq!(invites.mark_confirmed(invite.id()).await.ok(), Some(true));
    assert_eq!(invites.mark_confirmed(invite.id()).await.ok(), Some(false));

    let due = invites
        .list_due_reminders(far_future(0), far_future(3))
        .await
        .unwrap_or_default();
    assert!(due.iter().any(|reminder| reminder.invite.id() == invite.id()
        && reminder.event.id() == event.id()
        && reminder.invite.is_coming()));

    assert_eq!(invites.mark_reminder_sent(invite.id()).await.ok(), Some(true));
    assert_eq!(invites.mark_reminder_sent(invite.id()).await.ok(), Some(false));

    let due = invites
        .list_due_reminders(far_future(0), far_future(3))
        .await
        .unwrap_or_default();
    assert!(!due.iter().any(|reminder| reminder.invite.id() == invite.id()));
}

#[tokio::test]
async fn duplicate_invite_email_is_a_conflict_per_event() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let owner = seed_owner(&pool).await;
    let events = PostgresEventRepository::new(pool.clone());
    let invites = PostgresInviteRepository::new(pool.clone());
    let first = events
        .create_event(owner, &details(far_future(10)))
        .await
        .unwrap_or_else(|_| unreachable!());
    let second = events
        .create_event(owner, &details(far_future(11)))
        .await
        .unwrap_or_else(|_| unreachable!());
    let invitee = Invitee::new("Ada", "ada@example.com").unwrap_or_else(|_| unreachable!());

    assert!(invites.create_invite(first.id(), &invitee).await.is_ok());
    assert!(matches!(
        invites.create_invite(first.id(), &invitee).await,
        Err(AppError::Conflict(_))
    ));
    assert!(invites.create_invite(second.id(), &invitee).await.is_ok());
}

#[tokio::test]
async fn deleting_an_event_removes_its_invites() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let owner = seed_owner(&pool).await;
    let events = PostgresEventRepository::new(pool.clone());
    let invites = PostgresInviteRepository::new(pool.clone());
    let event = events
        .create_event(owner, &details(far_future(20)))
        .await
        .unwrap_or_else(|_| unreachable!());
    let invitee = Invitee::new("Ada", "ada@example.com").unwrap_or_else(|_| unreachable!());
    let invite = invites
        .create_invite(event.id(), &invitee)
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(events.delete_event(event.id()).await.ok(), Some(true));
    assert!(matches!(invites.find_invite(invite.id()).await, Ok(None)));
    assert!(matches!(
        invites.create_invite(event.id(), &invitee).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn user_emails_are_unique_case_insensitively() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let users = PostgresUserRepository::new(pool.clone());
    let email = format!("Case-{}@Example.com", Uuid::new_v4());
    let created = users.create(email.as_str(), "Owner", "hash").await;
    assert!(created.is_ok());

    assert!(matches!(
        users.create(email.to_lowercase().as_str(), "Owner", "hash").await,
        Err(AppError::Conflict(_))
    ));
    let found = users.find_by_email(email.as_str()).await;
    assert_eq!(
        found.ok().flatten().map(|user| user.email),
        Some(email.to_lowercase())
    );
}

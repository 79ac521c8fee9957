mod email;

use std::sync::Arc;

use kinboard_application::{
    AccessTokenService, ConfirmationTokenService, EmailService, EventRepository, EventService,
    InviteConfirmationService, InviteMailer, InviteRepository, InviteService, PasswordHasher,
    ReminderService, TokenSettings, UserRepository, UserService,
};
use kinboard_core::AppError;
use kinboard_infrastructure::{
    Argon2PasswordHasher, PostgresEventRepository, PostgresInviteRepository,
    PostgresUserRepository,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::api_config::ApiConfig;
use crate::state::AppState;

pub use email::build_email_service;

/// Opens the Postgres pool and brings the schema up to date.
pub async fn connect_and_migrate(config: &ApiConfig) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(config.database_url.as_str())
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    let migrator = sqlx::migrate!("../../crates/infrastructure/migrations");
    migrator
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;
    info!(
        max_connections = config.database_max_connections,
        migrations = migrator.iter().count(),
        "database ready"
    );

    Ok(pool)
}

/// Ports an [`AppState`] is assembled from.
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub events: Arc<dyn EventRepository>,
    pub invites: Arc<dyn InviteRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub email_service: Arc<dyn EmailService>,
    pub postgres_pool: Option<PgPool>,
}

impl Repositories {
    pub fn postgres(pool: PgPool, email_service: Arc<dyn EmailService>) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            events: Arc::new(PostgresEventRepository::new(pool.clone())),
            invites: Arc::new(PostgresInviteRepository::new(pool.clone())),
            password_hasher: Arc::new(Argon2PasswordHasher::new()),
            email_service,
            postgres_pool: Some(pool),
        }
    }
}

/// Request-serving state plus the reminder service for the scheduler task.
pub struct BuiltServices {
    pub state: AppState,
    pub reminder_service: ReminderService,
}

pub fn build_services(
    config: &ApiConfig,
    repositories: Repositories,
) -> Result<BuiltServices, AppError> {
    let mut settings = TokenSettings::new(config.jwt_secret.as_str(), config.jwt_issuer.as_str())?;
    if let Some(audience) = &config.jwt_audience {
        settings = settings.with_audience(audience.as_str())?;
    }

    let confirmation_tokens = ConfirmationTokenService::new(settings.clone());
    let access_token_service =
        AccessTokenService::new(settings, config.access_token_ttl_minutes)?;
    let mailer = InviteMailer::new(
        repositories.email_service,
        confirmation_tokens.clone(),
        config.frontend_url.as_str(),
    )?;

    let state = AppState {
        user_service: UserService::new(repositories.users, repositories.password_hasher),
        access_token_service,
        event_service: EventService::new(repositories.events.clone()),
        invite_service: InviteService::new(
            repositories.events,
            repositories.invites.clone(),
            mailer.clone(),
        ),
        confirmation_service: InviteConfirmationService::new(
            repositories.invites.clone(),
            confirmation_tokens,
        ),
        postgres_pool: repositories.postgres_pool,
    };
    let reminder_service =
        ReminderService::new(repositories.invites, mailer, config.reminder_window_days);

    Ok(BuiltServices {
        state,
        reminder_service,
    })
}

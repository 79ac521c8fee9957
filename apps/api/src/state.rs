use kinboard_application::{
    AccessTokenService, EventService, InviteConfirmationService, InviteService, UserService,
};
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub access_token_service: AccessTokenService,
    pub event_service: EventService,
    pub invite_service: InviteService,
    pub confirmation_service: InviteConfirmationService,
    /// `None` when running on in-memory repositories.
    pub postgres_pool: Option<PgPool>,
}

//! Application services and ports.

#![forbid(unsafe_code)]

mod event_service;
mod invite_confirmation_service;
mod invite_mailer;
mod invite_ports;
mod invite_service;
mod reminder_service;
mod token_service;
mod user_service;

#[cfg(test)]
mod test_support;

pub use event_service::{EventRepository, EventService};
pub use invite_confirmation_service::InviteConfirmationService;
pub use invite_mailer::{EmailService, InviteMailer};
pub use invite_ports::{DueReminder, InviteRepository};
pub use invite_service::{CreatedInvite, InviteService};
pub use reminder_service::{
    DEFAULT_REMINDER_WINDOW_DAYS, ReminderRunSummary, ReminderService,
};
pub use token_service::{
    AccessToken, AccessTokenService, CONFIRMATION_TOKEN_LIFETIME_HOURS, ConfirmationClaims,
    ConfirmationTokenService, TokenSettings,
};
pub use user_service::{
    AuthOutcome, PasswordHasher, RegisterParams, UserRecord, UserRepository, UserService,
};

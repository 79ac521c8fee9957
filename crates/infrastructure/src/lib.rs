//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod console_email_service;
mod in_memory_repository;
mod postgres_event_repository;
mod postgres_invite_repository;
mod postgres_user_repository;
mod smtp_email_service;

pub use argon2_password_hasher::{Argon2PasswordHasher, HashingCost};
pub use console_email_service::ConsoleEmailService;
pub use in_memory_repository::InMemoryRepository;
pub use postgres_event_repository::PostgresEventRepository;
pub use postgres_invite_repository::PostgresInviteRepository;
pub use postgres_user_repository::PostgresUserRepository;
pub use smtp_email_service::{SmtpEmailConfig, SmtpEmailService, SmtpTls};

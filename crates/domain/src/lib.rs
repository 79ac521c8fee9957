//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod event;
mod invite;
mod user;

pub use event::{Event, EventDetails, EventId};
pub use invite::{ConfirmationOutcome, Invite, InviteId, InviteStatus, Invitee};
pub use user::{
    EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, UserId, validate_password,
};

pub mod confirm;
pub mod events;
pub mod health;
pub mod invites;


use kinboard_core::UserIdentity;
use kinboard_domain::UserId;

fn owner_id(user: &UserIdentity) -> UserId {
    UserId::from_uuid(user.user_id())
}

//! Database models with SQLx `FromRow` derives

mod application;
mod user;

pub use application::ApplicationModel;
pub use user::{GeneratedKeyModel, UserInviteModel, UserModel};

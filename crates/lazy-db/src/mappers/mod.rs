//! Entity <-> Model mappers

mod application;
mod user;

pub use user::UserUpsert;

//! PostgreSQL repository implementations

mod application;
mod error;
mod user;

pub use application::PgApplicationRepository;
pub use user::PgUserRepository;

//! sqlx error mapping shared by the repositories

use lazy_core::error::DomainError;
use lazy_core::value_objects::Snowflake;
use sqlx::Error as SqlxError;

pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// `user_invites` has a unique (owner, code) pair; a second insert of the
/// same code for the same owner surfaces as `InviteCodeExists`.
pub fn map_invite_insert(e: SqlxError, code: &str) -> DomainError {
    match e.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => {
            DomainError::InviteCodeExists(code.to_string())
        }
        _ => map_db_error(e),
    }
}

pub fn user_not_found(id: Snowflake) -> DomainError {
    DomainError::UserNotFound(id)
}

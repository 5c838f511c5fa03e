//! Request DTOs for command options
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use lazy_core::{AccessTier, Snowflake};
use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Access Requests
// ============================================================================

/// `/access grant`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GrantAccessRequest {
    pub user_id: Snowflake,

    #[validate(length(min = 1, max = 32, message = "Username must be 1-32 characters"))]
    pub username: String,

    pub tier: AccessTier,

    #[validate(length(max = 512, message = "Reason must be at most 512 characters"))]
    pub reason: Option<String>,
}

/// `/access revoke`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RevokeAccessRequest {
    pub user_id: Snowflake,

    #[validate(length(max = 512, message = "Reason must be at most 512 characters"))]
    pub reason: Option<String>,
}

// ============================================================================
// Key Requests
// ============================================================================

/// `/key generate`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateKeyRequest {
    #[validate(range(min = 1, max = 3650, message = "Days must be between 1 and 3650"))]
    pub days: i32,

    #[validate(length(min = 1, max = 200, message = "Note must be 1-200 characters"))]
    pub note: String,
}

/// `/hwid-reset`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct HwidResetRequest {
    #[validate(length(min = 1, max = 128, message = "Key must be 1-128 characters"))]
    pub key: String,
}

// ============================================================================
// Application Requests
// ============================================================================

/// `/application approve|deny`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ApplicationDecisionRequest {
    pub user_id: Snowflake,

    #[validate(length(min = 1, max = 32, message = "Username must be 1-32 characters"))]
    pub username: String,

    #[validate(length(max = 1024, message = "Reason must be at most 1024 characters"))]
    pub reason: Option<String>,
}

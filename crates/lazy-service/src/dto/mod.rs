//! Data transfer objects for command input and replies
//!
//! This module provides:
//! - Request DTOs with validation for slash command options
//! - Reply and health response types

pub mod requests;
pub mod responses;

pub use requests::{
    ApplicationDecisionRequest, GenerateKeyRequest, GrantAccessRequest, HwidResetRequest,
    RevokeAccessRequest,
};

pub use responses::{HealthChecks, HealthResponse, KeyListPage, ReadinessResponse, Reply};

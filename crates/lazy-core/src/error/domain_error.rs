//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Failures of the licensing panel automation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PanelError {
    #[error("Panel credentials are not configured")]
    MissingCredentials,

    #[error("Failed to find element: {0}")]
    SelectorNotFound(String),

    #[error("Navigation timeout during {0}")]
    NavigationTimeout(String),

    #[error("No key found in panel output")]
    KeyNotFound,

    #[error("Browser error: {0}")]
    Browser(String),
}

impl PanelError {
    /// User-facing message for this failure class
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "Configuration error. Please contact an administrator.",
            Self::SelectorNotFound(_) => {
                "Failed to access the panel. The page structure may have changed."
            }
            Self::NavigationTimeout(_) => {
                "The panel is taking too long to respond. Please try again later."
            }
            Self::KeyNotFound | Self::Browser(_) => {
                "An error occurred while generating your key. Please try again later."
            }
        }
    }
}

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User record not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Channel not found: {0}")]
    ChannelNotFound(Snowflake),

    #[error("Member not found in guild: {0}")]
    MemberNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Missing context: {0}")]
    MissingContext(&'static str),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Invite code already tracked: {0}")]
    InviteCodeExists(String),

    // =========================================================================
    // External Dependencies
    // =========================================================================
    #[error(transparent)]
    Panel(#[from] PanelError),

    #[error("Platform error: {0}")]
    PlatformError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl DomainError {
    /// Get an error code string for logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::ChannelNotFound(_) => "UNKNOWN_CHANNEL",
            Self::MemberNotFound(_) => "UNKNOWN_MEMBER",

            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::MissingContext(_) => "MISSING_CONTEXT",

            Self::InviteCodeExists(_) => "INVITE_CODE_EXISTS",

            Self::Panel(PanelError::MissingCredentials) => "PANEL_NOT_CONFIGURED",
            Self::Panel(PanelError::SelectorNotFound(_)) => "PANEL_SELECTOR_NOT_FOUND",
            Self::Panel(PanelError::NavigationTimeout(_)) => "PANEL_TIMEOUT",
            Self::Panel(PanelError::KeyNotFound) => "PANEL_KEY_NOT_FOUND",
            Self::Panel(PanelError::Browser(_)) => "PANEL_BROWSER_ERROR",
            Self::PlatformError(_) => "PLATFORM_ERROR",
            Self::DatabaseError(_) => "DATABASE_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::ChannelNotFound(_)
                | Self::MemberNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_) | Self::MissingContext(_))
    }

    /// Check if this came from an external dependency
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            Self::Panel(_) | Self::PlatformError(_) | Self::DatabaseError(_)
        )
    }
}

//! Service layer error types
//!
//! Provides a unified error type for all service operations.

use lazy_core::{DomainError, Notice, PanelError};
use std::fmt;
use validator::ValidationErrors;

/// Reply used when nothing more specific can be said
pub const GENERIC_FAILURE: &str = "An unexpected error occurred. Please try again later.";

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Domain or port failure
    Domain(DomainError),

    /// Bad command input; the message is shown as is
    Validation(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

impl ServiceError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// The panel failure behind this error, if any
    pub fn panel_error(&self) -> Option<&PanelError> {
        match self {
            Self::Domain(DomainError::Panel(e)) => Some(e),
            _ => None,
        }
    }

    /// Text safe to show to the invoking user
    pub fn user_message(&self) -> String {
        match self {
            Self::Domain(DomainError::Panel(e)) => e.user_message().to_string(),
            Self::Domain(e) if e.is_validation() => e.to_string(),
            Self::Domain(_) => GENERIC_FAILURE.to_string(),
            Self::Validation(msg) => msg.clone(),
        }
    }

    /// Red "Error" notice carrying [`Self::user_message`]
    pub fn notice(&self) -> Notice {
        Notice::error("Error", self.user_message())
    }

    /// Get the error code for logs
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<PanelError> for ServiceError {
    fn from(err: PanelError) -> Self {
        Self::Domain(DomainError::Panel(err))
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map_or_else(|| format!("Invalid {field}"), ToString::to_string)
                })
            })
            .collect();
        messages.sort();
        Self::Validation(messages.join(" "))
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

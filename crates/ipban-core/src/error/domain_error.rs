//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{BanId, UserId};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Ban not found: {0}")]
    BanNotFound(BanId),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid ban target '{0}': expected an IP address or CIDR range")]
    InvalidTarget(String),

    #[error("Invalid ban mode '{0}': expected block, firewall or ghost")]
    InvalidBanMode(String),

    #[error("Ban expiry must be after the time it was added")]
    InvalidExpiry,

    #[error("Invalid network address: {0}")]
    InvalidAddress(String),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Missing permission: {0}")]
    MissingPermission(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::BanNotFound(_) => "UNKNOWN_BAN",
            Self::UserNotFound(_) => "UNKNOWN_USER",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidTarget(_) => "INVALID_BAN_TARGET",
            Self::InvalidBanMode(_) => "INVALID_BAN_MODE",
            Self::InvalidExpiry => "INVALID_BAN_EXPIRY",
            Self::InvalidAddress(_) => "INVALID_ADDRESS",

            // Authorization
            Self::MissingPermission(_) => "MISSING_PERMISSIONS",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::BanNotFound(_) | Self::UserNotFound(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidTarget(_)
                | Self::InvalidBanMode(_)
                | Self::InvalidExpiry
                | Self::InvalidAddress(_)
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::MissingPermission(_))
    }
}

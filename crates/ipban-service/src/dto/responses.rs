//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.

use chrono::{DateTime, Utc};
use serde::Serialize;

use ipban_core::entities::{Ban, BanListing, BanMode};
use ipban_core::value_objects::{BanId, Permissions, UserClass, UserId};

use crate::services::BanNotice;

// ============================================================================
// Ban Responses
// ============================================================================

/// Ban record as returned by the management endpoints
#[derive(Debug, Clone, Serialize)]
pub struct BanResponse {
    pub id: BanId,
    pub target: String,
    pub mode: BanMode,
    pub reason: String,
    pub banned_by: UserId,
    /// Name of the admin who issued the ban, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    pub added_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<Ban> for BanResponse {
    fn from(ban: Ban) -> Self {
        Self {
            id: ban.id,
            target: ban.target,
            mode: ban.mode,
            reason: ban.reason,
            banned_by: ban.created_by,
            banner: None,
            added_at: ban.added_at,
            expires_at: ban.expires_at,
        }
    }
}

impl From<BanListing> for BanResponse {
    fn from(listing: BanListing) -> Self {
        Self {
            banner: listing.banner,
            ..Self::from(listing.ban)
        }
    }
}

/// One page of bans
#[derive(Debug, Serialize)]
pub struct BanListResponse {
    pub data: Vec<BanResponse>,
    pub pagination: PaginationMeta,
}

/// Offset pagination metadata
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub limit: i64,
    pub offset: i64,
    /// Whether more results exist past this page
    pub has_more: bool,
}

// ============================================================================
// Session Responses
// ============================================================================

/// Effective identity of the current request
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub class: UserClass,
    pub permissions: Permissions,
    pub permission_names: Vec<&'static str>,
    /// Notice attached by the ban gate to a ghosted request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ban_notice: Option<BanNotice>,
}

impl SessionResponse {
    pub fn new(user_id: Option<UserId>, class: UserClass, ban_notice: Option<BanNotice>) -> Self {
        let permissions = class.permissions();
        Self {
            user_id,
            class,
            permissions,
            permission_names: permissions.list(),
            ban_notice,
        }
    }
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each dependency
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool) -> Self {
        Self {
            status: if database_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: if database_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }
}

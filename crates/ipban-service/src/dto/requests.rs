//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.
//! Field syntax (address, mode, expiry) is checked again by the domain when the
//! ban is built.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use ipban_core::traits::BanQuery;

// ============================================================================
// Ban Requests
// ============================================================================

/// Create ban request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBanRequest {
    /// Address or CIDR range
    #[validate(length(min = 1, max = 64, message = "Target must be 1-64 characters"))]
    pub target: String,

    /// `block`, `firewall` or `ghost`
    #[serde(default = "default_mode")]
    pub mode: String,

    #[validate(length(min = 1, max = 1024, message = "Reason must be 1-1024 characters"))]
    pub reason: String,

    /// Omit for a permanent ban
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_mode() -> String {
    "block".to_string()
}

/// Ban list query parameters
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListBansRequest {
    /// Include expired bans
    #[serde(default)]
    pub all: bool,

    #[validate(range(min = 1, max = 100, message = "Limit must be 1-100"))]
    pub limit: Option<i64>,

    #[validate(range(min = 0, message = "Offset must not be negative"))]
    pub offset: Option<i64>,
}

impl ListBansRequest {
    /// Store query for this request as of `now`
    pub fn to_query(&self, now: DateTime<Utc>) -> BanQuery {
        BanQuery {
            active_only: !self.all,
            now,
            limit: self
                .limit
                .unwrap_or(BanQuery::DEFAULT_LIMIT)
                .clamp(1, BanQuery::MAX_LIMIT),
            offset: self.offset.unwrap_or(0).max(0),
        }
    }
}

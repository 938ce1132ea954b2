//! Test fixtures
//!
//! In-memory repositories standing in for PostgreSQL, plus request bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use ipban_service::services::testing::{
    seeded_users, InMemoryBanRepository, InMemoryUserRepository, ADMIN_ID, ADMIN_NAME,
};

/// Body for `POST /api/v1/ip-bans`
#[derive(Debug, Serialize)]
pub struct CreateBanBody {
    pub target: String,
    pub mode: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreateBanBody {
    pub fn new(target: &str, mode: &str, reason: &str) -> Self {
        Self {
            target: target.to_string(),
            mode: mode.to_string(),
            reason: reason.to_string(),
            expires_at: None,
        }
    }

    pub fn until(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

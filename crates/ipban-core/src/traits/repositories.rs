//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{Ban, BanListing, NewBan};
use crate::error::DomainError;
use crate::value_objects::{BanId, UserId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Ban Repository
// ============================================================================

/// Filter and page options for listing bans
#[derive(Debug, Clone)]
pub struct BanQuery {
    /// Only bans that have not expired at `now`
    pub active_only: bool,
    /// Reference time for `active_only`
    pub now: DateTime<Utc>,
    pub limit: i64,
    pub offset: i64,
}

impl BanQuery {
    /// Default page size of the ban list
    pub const DEFAULT_LIMIT: i64 = 10;
    /// Largest page a caller may request
    pub const MAX_LIMIT: i64 = 100;

    /// First page of active bans
    pub fn active(now: DateTime<Utc>) -> Self {
        Self {
            active_only: true,
            now,
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

#[async_trait]
pub trait BanRepository: Send + Sync {
    /// Insert a validated ban and return its new id
    async fn create(&self, ban: &NewBan) -> RepoResult<BanId>;

    /// Delete a ban, returning the removed record if there was one
    async fn delete(&self, id: BanId) -> RepoResult<Option<Ban>>;

    /// Find a ban by id
    async fn find_by_id(&self, id: BanId) -> RepoResult<Option<Ban>>;

    /// All bans with no expiry or an expiry after `now`,
    /// soonest-expiring first (permanent bans last), then by id
    async fn list_active(&self, now: DateTime<Utc>) -> RepoResult<Vec<Ban>>;

    /// One page of bans with the issuing admin's name, in `list_active` order
    async fn list(&self, query: &BanQuery) -> RepoResult<Vec<BanListing>>;

    /// Check that the store is reachable
    async fn ping(&self) -> RepoResult<()>;
}

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Display name of a user
    async fn find_name(&self, id: UserId) -> RepoResult<Option<String>>;
}

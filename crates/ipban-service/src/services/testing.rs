//! In-memory repositories for tests
//!
//! Shared by this crate's unit tests and, through the `test-util` feature,
//! by the end-to-end tests that drive the HTTP router.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use ipban_core::entities::{Ban, BanListing, BanMode, NewBan};
use ipban_core::traits::{BanQuery, BanRepository, RepoResult, UserRepository};
use ipban_core::value_objects::{BanId, UserId};
use ipban_core::DomainError;

/// Id of the seeded admin account
pub const ADMIN_ID: i64 = 1;
/// Name of the seeded admin account
pub const ADMIN_NAME: &str = "admin";

/// Accounts every in-memory store starts with
pub fn seeded_users() -> HashMap<UserId, String> {
    HashMap::from([(UserId::new(ADMIN_ID), ADMIN_NAME.to_string())])
}

/// Ban table held in memory
///
/// Rows come back in the order `PgBanRepository` uses: soonest expiry first,
/// permanent bans last, then by id.
#[derive(Debug, Default)]
pub struct InMemoryBanRepository {
    rows: Mutex<Vec<Ban>>,
    next_id: AtomicI64,
    users: HashMap<UserId, String>,
    unavailable: AtomicBool,
}

impl InMemoryBanRepository {
    pub fn new(users: HashMap<UserId, String>) -> Self {
        Self {
            users,
            ..Default::default()
        }
    }

    /// Insert a ban by the seeded admin, bypassing validation and cache invalidation
    pub fn seed(
        &self,
        target: &str,
        mode: BanMode,
        reason: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> BanId {
        self.push(target, mode, reason, UserId::new(ADMIN_ID), expires_at)
    }

    /// Insert a permanent ban issued by `created_by`
    pub fn seed_by(&self, target: &str, mode: BanMode, created_by: UserId) -> BanId {
        self.push(target, mode, "test", created_by, None)
    }

    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make every call fail as if the database were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn allocate_id(&self) -> BanId {
        BanId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn push(
        &self,
        target: &str,
        mode: BanMode,
        reason: &str,
        created_by: UserId,
        expires_at: Option<DateTime<Utc>>,
    ) -> BanId {
        let id = self.allocate_id();
        self.rows.lock().push(Ban {
            id,
            target: target.to_string(),
            mode,
            reason: reason.to_string(),
            created_by,
            added_at: Utc::now(),
            expires_at,
        });
        id
    }

    fn check_available(&self) -> RepoResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("connection refused".to_string()));
        }
        Ok(())
    }

    fn ordered(&self, include: impl Fn(&Ban) -> bool) -> Vec<Ban> {
        let mut rows: Vec<Ban> = self.rows.lock().iter().filter(|b| include(b)).cloned().collect();
        rows.sort_by_key(|b| (b.expires_at.is_none(), b.expires_at, b.id));
        rows
    }
}

#[async_trait]
impl BanRepository for InMemoryBanRepository {
    async fn create(&self, ban: &NewBan) -> RepoResult<BanId> {
        self.check_available()?;
        let id = self.allocate_id();
        self.rows.lock().push(ban.clone().into_ban(id));
        Ok(id)
    }

    async fn delete(&self, id: BanId) -> RepoResult<Option<Ban>> {
        self.check_available()?;
        let mut rows = self.rows.lock();
        Ok(rows
            .iter()
            .position(|b| b.id == id)
            .map(|pos| rows.remove(pos)))
    }

    async fn find_by_id(&self, id: BanId) -> RepoResult<Option<Ban>> {
        self.check_available()?;
        Ok(self.rows.lock().iter().find(|b| b.id == id).cloned())
    }

    async fn list_active(&self, now: DateTime<Utc>) -> RepoResult<Vec<Ban>> {
        self.check_available()?;
        Ok(self.ordered(|b| b.is_active_at(now)))
    }

    async fn list(&self, query: &BanQuery) -> RepoResult<Vec<BanListing>> {
        self.check_available()?;
        Ok(self
            .ordered(|b| !query.active_only || b.is_active_at(query.now))
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .map(|ban| BanListing {
                banner: self.users.get(&ban.created_by).cloned(),
                ban,
            })
            .collect())
    }

    async fn ping(&self) -> RepoResult<()> {
        self.check_available()
    }
}

/// User names held in memory
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    names: HashMap<UserId, String>,
}

impl InMemoryUserRepository {
    pub fn new(names: HashMap<UserId, String>) -> Self {
        Self { names }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_name(&self, id: UserId) -> RepoResult<Option<String>> {
        Ok(self.names.get(&id).cloned())
    }
}

#[cfg(test)]
pub(crate) use unit::{compact_settings, t0, test_context, test_context_with};

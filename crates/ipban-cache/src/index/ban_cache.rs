//! Active-ban index cache.
//!
//! Holds the most recently built [`BanIndex`] for a bounded time. Reads past
//! the window (or after [`BanCache::invalidate`]) rebuild from the ban store.
//! Concurrent readers that all find the cache stale each rebuild; the results
//! are identical so the last one stored wins.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use ipban_core::index::{BanIndex, BuildReport};
use ipban_core::traits::BanRepository;
use ipban_core::DomainError;

/// Ban cache configuration
#[derive(Debug, Clone)]
pub struct BanCacheConfig {
    /// Longest time a built index is served
    pub ttl: Duration,
}

impl Default for BanCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::seconds(600),
        }
    }
}

impl From<&ipban_common::IpBanConfig> for BanCacheConfig {
    /// Out-of-range windows are clamped to the bounds `AppConfig::from_env` enforces
    fn from(config: &ipban_common::IpBanConfig) -> Self {
        let secs = config.cache_ttl_secs.clamp(
            ipban_common::MIN_CACHE_TTL_SECS,
            ipban_common::MAX_CACHE_TTL_SECS,
        );
        let ttl = i64::try_from(secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or_else(|| Self::default().ttl);
        Self { ttl }
    }
}

/// Error type for cache operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Failed to load active bans: {0}")]
    Store(#[from] DomainError),
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

impl From<CacheError> for DomainError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Store(e) => e,
        }
    }
}

#[derive(Debug)]
struct CachedIndex {
    index: Arc<BanIndex>,
    built_at: DateTime<Utc>,
    valid_until: DateTime<Utc>,
}

impl CachedIndex {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.built_at <= now && now < self.valid_until
    }
}

/// Process-wide cache of the active-ban index
pub struct BanCache {
    repo: Arc<dyn BanRepository>,
    ttl: Duration,
    slot: RwLock<Option<CachedIndex>>,
    /// Bumped by every invalidation; a rebuild that started before one is not stored
    generation: AtomicU64,
}

impl std::fmt::Debug for BanCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BanCache")
            .field("ttl", &self.ttl)
            .field("cached_at", &self.cached_at())
            .field("generation", &self.generation.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Shared cache handle
pub type SharedBanCache = Arc<BanCache>;

/// Create a shared ban cache over a store
pub fn create_shared_cache(repo: Arc<dyn BanRepository>, config: BanCacheConfig) -> SharedBanCache {
    Arc::new(BanCache::new(repo, config))
}

impl BanCache {
    pub fn new(repo: Arc<dyn BanRepository>, config: BanCacheConfig) -> Self {
        Self {
            repo,
            ttl: config.ttl,
            slot: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Validity window of a built index
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// When the cached index was built, if one is held
    pub fn cached_at(&self) -> Option<DateTime<Utc>> {
        self.slot.read().as_ref().map(|cached| cached.built_at)
    }

    /// End of the TTL window for an index built at `now`
    fn window_end(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Get the active-ban index as of `now`.
    ///
    /// The cached index is returned while it is fresh. It goes stale when it
    /// is older than the TTL, or earlier if one of its bans expires first, so
    /// an expired ban never outlives its expiry inside the cache.
    #[instrument(skip(self))]
    pub async fn get_index(&self, now: DateTime<Utc>) -> CacheResult<Arc<BanIndex>> {
        let fresh = self
            .slot
            .read()
            .as_ref()
            .filter(|cached| cached.is_fresh(now))
            .map(|cached| Arc::clone(&cached.index));
        if let Some(index) = fresh {
            return Ok(index);
        }

        let generation = self.generation.load(Ordering::Acquire);
        let records = self.repo.list_active(now).await?;

        let valid_until = records
            .iter()
            .filter_map(|ban| ban.expires_at)
            .fold(self.window_end(now), |earliest, expires| earliest.min(expires));

        let BuildReport { index, skipped } = BanIndex::build(&records);
        for skip in &skipped {
            warn!(
                ban_id = %skip.ban_id,
                target = %skip.target,
                reason = %skip.reason,
                "Skipping ban with unparseable target"
            );
        }

        let index = Arc::new(index);
        let stored = {
            let mut slot = self.slot.write();
            if self.generation.load(Ordering::Acquire) == generation {
                *slot = Some(CachedIndex {
                    index: Arc::clone(&index),
                    built_at: now,
                    valid_until,
                });
                true
            } else {
                false
            }
        };

        debug!(
            exact = index.exact_len(),
            ranges = index.range_len(),
            skipped = skipped.len(),
            %valid_until,
            stored,
            "Rebuilt active-ban index"
        );

        Ok(index)
    }

    /// Drop the cached index; the next read rebuilds.
    ///
    /// Call after the ban store write has committed.
    pub fn invalidate(&self) {
        let mut slot = self.slot.write();
        self.generation.fetch_add(1, Ordering::AcqRel);
        *slot = None;
        debug!("Active-ban index invalidated");
    }
}

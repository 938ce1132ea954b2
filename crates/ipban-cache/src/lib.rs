//! # ipban-cache
//!
//! Process-wide cache of the active-ban index.
//!
//! ## Features
//!
//! - **Validity window**: a built index is served until it is older than the
//!   configured TTL, then rebuilt from the ban store on the next read
//! - **Explicit invalidation**: ban mutations drop the index so the next read
//!   sees the write
//!
//! ## Example
//!
//! ```ignore
//! use ipban_cache::{BanCache, BanCacheConfig};
//!
//! let cache = BanCache::new(ban_repo, BanCacheConfig::default());
//!
//! let index = cache.get_index(Utc::now()).await?;
//! let verdict = ipban_core::index::check("10.5.5.5", &index)?;
//!
//! // After adding or removing a ban
//! cache.invalidate();
//! ```

pub mod index;

pub use index::{
    create_shared_cache, BanCache, BanCacheConfig, CacheError, CacheResult, SharedBanCache,
};

//! Cached active-ban index

mod ban_cache;

pub use ban_cache::{
    create_shared_cache, BanCache, BanCacheConfig, CacheError, CacheResult, SharedBanCache,
};

//! Service context - dependency container for services
//!
//! Holds the repositories, the ban cache, and the settings the ban services need.

use std::sync::Arc;

use ipban_cache::{create_shared_cache, BanCache, BanCacheConfig, SharedBanCache};
use ipban_common::auth::JwtService;
use ipban_common::IpBanConfig;
use ipban_core::traits::{BanRepository, UserRepository};

use super::error::{ServiceError, ServiceResult};
use super::notice::NoticeTemplate;

/// Ban notice settings
#[derive(Debug, Clone)]
pub struct IpBanSettings {
    /// Template rendered for banned requesters
    pub template: NoticeTemplate,
    /// Staff contact link substituted for `$CONTACT`
    pub contact_link: Option<String>,
}

impl Default for IpBanSettings {
    fn default() -> Self {
        Self::from(&IpBanConfig::default())
    }
}

impl From<&IpBanConfig> for IpBanSettings {
    fn from(config: &IpBanConfig) -> Self {
        Self {
            template: NoticeTemplate::new(config.message.clone()),
            contact_link: config.contact_link.clone(),
        }
    }
}

/// Service context containing all dependencies
///
/// Passed by reference to every service. Cloning is cheap; all members are shared.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    ban_repo: Arc<dyn BanRepository>,
    user_repo: Arc<dyn UserRepository>,

    // Cache
    ban_cache: SharedBanCache,

    // Settings and services
    settings: Arc<IpBanSettings>,
    jwt_service: Arc<JwtService>,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        ban_repo: Arc<dyn BanRepository>,
        user_repo: Arc<dyn UserRepository>,
        ban_cache: SharedBanCache,
        settings: IpBanSettings,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            ban_repo,
            user_repo,
            ban_cache,
            settings: Arc::new(settings),
            jwt_service,
        }
    }

    /// Start building a context
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    /// Get the ban repository
    pub fn ban_repo(&self) -> &dyn BanRepository {
        self.ban_repo.as_ref()
    }

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    // === Cache ===

    /// Get the active-ban index cache
    pub fn ban_cache(&self) -> &BanCache {
        self.ban_cache.as_ref()
    }

    // === Settings and services ===

    /// Get the ban notice settings
    pub fn settings(&self) -> &IpBanSettings {
        &self.settings
    }

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("ban_cache", &self.ban_cache)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Builder for creating ServiceContext with custom configuration
///
/// When no cache is supplied, one is created over the ban repository.
#[derive(Default)]
pub struct ServiceContextBuilder {
    ban_repo: Option<Arc<dyn BanRepository>>,
    user_repo: Option<Arc<dyn UserRepository>>,
    ban_cache: Option<SharedBanCache>,
    cache_config: BanCacheConfig,
    settings: IpBanSettings,
    jwt_service: Option<Arc<JwtService>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ban_repo(mut self, repo: Arc<dyn BanRepository>) -> Self {
        self.ban_repo = Some(repo);
        self
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn ban_cache(mut self, cache: SharedBanCache) -> Self {
        self.ban_cache = Some(cache);
        self
    }

    pub fn cache_config(mut self, config: BanCacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    pub fn settings(mut self, settings: IpBanSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let ban_repo = self
            .ban_repo
            .ok_or_else(|| ServiceError::validation("ban_repo is required"))?;
        let user_repo = self
            .user_repo
            .ok_or_else(|| ServiceError::validation("user_repo is required"))?;
        let jwt_service = self
            .jwt_service
            .ok_or_else(|| ServiceError::validation("jwt_service is required"))?;
        let ban_cache = self
            .ban_cache
            .unwrap_or_else(|| create_shared_cache(Arc::clone(&ban_repo), self.cache_config));

        Ok(ServiceContext::new(
            ban_repo,
            user_repo,
            ban_cache,
            self.settings,
            jwt_service,
        ))
    }
}

//! IP ban management service
//!
//! Adds, removes and lists bans. Every successful write invalidates the ban
//! cache before returning, so the next request sees it.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};
use validator::Validate;

use ipban_core::entities::{Ban, NewBan};
use ipban_core::value_objects::{BanId, UserId};

use crate::dto::{BanListResponse, BanResponse, CreateBanRequest, ListBansRequest, PaginationMeta};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// IP ban service
pub struct IpBanService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> IpBanService<'a> {
    /// Create a new IpBanService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Ban an address or range
    ///
    /// Invalid input is rejected before anything is written.
    #[instrument(skip(self, request), fields(target = %request.target))]
    pub async fn add_ban(
        &self,
        created_by: UserId,
        request: CreateBanRequest,
        now: DateTime<Utc>,
    ) -> ServiceResult<BanResponse> {
        request
            .validate()
            .map_err(|e| ServiceError::validation(e.to_string()))?;

        let new_ban = NewBan::new(
            &request.target,
            &request.mode,
            &request.reason,
            created_by,
            request.expires_at,
            now,
        )?;

        let id = self.ctx.ban_repo().create(&new_ban).await?;
        self.ctx.ban_cache().invalidate();

        let ban = new_ban.into_ban(id);
        info!(
            ban_id = %id,
            mode = %ban.mode,
            "Banned {} because '{}' until {}",
            ban.target,
            ban.reason,
            ban.expires_at
                .map_or_else(|| "never".to_string(), |at| at.to_rfc3339())
        );

        Ok(BanResponse::from(ban))
    }

    /// Remove a ban
    ///
    /// Returns whether a ban was actually removed. Removing an id that does
    /// not exist is not an error and leaves the cache alone.
    #[instrument(skip(self))]
    pub async fn remove_ban(&self, id: BanId) -> ServiceResult<bool> {
        let Some(ban) = self.ctx.ban_repo().delete(id).await? else {
            return Ok(false);
        };

        self.ctx.ban_cache().invalidate();
        info!(ban_id = %id, "Removed {}'s ban", ban.target);

        Ok(true)
    }

    /// Get a ban by id
    #[instrument(skip(self))]
    pub async fn get_ban(&self, id: BanId) -> ServiceResult<Ban> {
        self.ctx
            .ban_repo()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Ban", id.to_string()))
    }

    /// List bans, active ones only unless `request.all` is set
    #[instrument(skip(self))]
    pub async fn list_bans(
        &self,
        request: &ListBansRequest,
        now: DateTime<Utc>,
    ) -> ServiceResult<BanListResponse> {
        request
            .validate()
            .map_err(|e| ServiceError::validation(e.to_string()))?;

        let query = request.to_query(now);

        // Fetch one extra row to know whether another page exists
        let mut lookahead = query.clone();
        lookahead.limit += 1;
        let mut listings = self.ctx.ban_repo().list(&lookahead).await?;

        let has_more = listings.len() as i64 > query.limit;
        listings.truncate(query.limit as usize);

        Ok(BanListResponse {
            data: listings.into_iter().map(BanResponse::from).collect(),
            pagination: PaginationMeta {
                limit: query.limit,
                offset: query.offset,
                has_more,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{t0, test_context};
    use chrono::Duration;
    use ipban_core::entities::BanMode;
    use ipban_core::index::check;
    use ipban_core::DomainError;

    fn request(target: &str, mode: &str) -> CreateBanRequest {
        CreateBanRequest {
            target: target.to_string(),
            mode: mode.to_string(),
            reason: " spam ".to_string(),
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_add_ban_is_visible_immediately() {
        let (ctx, bans) = test_context();
        let service = IpBanService::new(&ctx);

        // Warm the cache with an empty index
        let index = ctx.ban_cache().get_index(t0()).await.unwrap();
        assert!(!check("192.168.1.100", &index).unwrap().is_banned());

        let created = service
            .add_ban(UserId::new(1), request("192.168.1.100", "block"), t0())
            .await
            .unwrap();
        assert_eq!(created.reason, "spam");
        assert_eq!(created.mode, BanMode::Block);
        assert_eq!(bans.len(), 1);

        let index = ctx
            .ban_cache()
            .get_index(t0() + Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(check("192.168.1.100", &index).unwrap().ban_id(), Some(created.id));
    }

    #[tokio::test]
    async fn test_remove_ban_is_visible_immediately() {
        let (ctx, _bans) = test_context();
        let service = IpBanService::new(&ctx);

        let created = service
            .add_ban(UserId::new(1), request("10.0.0.0/8", "ghost"), t0())
            .await
            .unwrap();
        let index = ctx.ban_cache().get_index(t0()).await.unwrap();
        assert!(check("10.5.5.5", &index).unwrap().is_banned());

        assert!(service.remove_ban(created.id).await.unwrap());

        let index = ctx.ban_cache().get_index(t0()).await.unwrap();
        assert!(!check("10.5.5.5", &index).unwrap().is_banned());
    }

    #[tokio::test]
    async fn test_remove_missing_ban() {
        let (ctx, _bans) = test_context();
        let service = IpBanService::new(&ctx);

        ctx.ban_cache().get_index(t0()).await.unwrap();
        assert!(!service.remove_ban(BanId::new(99)).await.unwrap());
        // Nothing was removed so the cached index is kept
        assert_eq!(ctx.ban_cache().cached_at(), Some(t0()));
    }

    #[tokio::test]
    async fn test_add_ban_rejects_bad_input_without_writing() {
        let (ctx, bans) = test_context();
        let service = IpBanService::new(&ctx);

        let err = service
            .add_ban(UserId::new(1), request("10.0.0.0/33", "block"), t0())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::InvalidTarget(_))));

        let err = service
            .add_ban(UserId::new(1), request("1.2.3.4", "kick"), t0())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::InvalidBanMode(_))));

        let mut past = request("1.2.3.4", "block");
        past.expires_at = Some(t0() - Duration::hours(1));
        let err = service.add_ban(UserId::new(1), past, t0()).await.unwrap_err();
        assert_eq!(err.status_code(), 400);

        let mut empty = request("1.2.3.4", "block");
        empty.reason = String::new();
        let err = service.add_ban(UserId::new(1), empty, t0()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        assert_eq!(bans.len(), 0);
    }

    #[tokio::test]
    async fn test_get_ban() {
        let (ctx, _bans) = test_context();
        let service = IpBanService::new(&ctx);

        let created = service
            .add_ban(UserId::new(1), request("::1", "firewall"), t0())
            .await
            .unwrap();
        assert_eq!(service.get_ban(created.id).await.unwrap().target, "::1");

        let err = service.get_ban(BanId::new(404)).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_list_bans_pages_and_filters() {
        let (ctx, bans) = test_context();
        let service = IpBanService::new(&ctx);

        for i in 1..=12 {
            service
                .add_ban(UserId::new(1), request(&format!("10.0.0.{i}"), "block"), t0())
                .await
                .unwrap();
        }
        bans.seed("10.9.9.9", BanMode::Block, "old", Some(t0() - Duration::hours(1)));

        let first = service.list_bans(&ListBansRequest::default(), t0()).await.unwrap();
        assert_eq!(first.data.len(), 10);
        assert!(first.pagination.has_more);
        assert_eq!(first.data[0].banner.as_deref(), Some("admin"));

        let second = service
            .list_bans(
                &ListBansRequest {
                    offset: Some(10),
                    ..Default::default()
                },
                t0(),
            )
            .await
            .unwrap();
        assert_eq!(second.data.len(), 2);
        assert!(!second.pagination.has_more);

        let all = service
            .list_bans(
                &ListBansRequest {
                    all: true,
                    limit: Some(100),
                    ..Default::default()
                },
                t0(),
            )
            .await
            .unwrap();
        assert_eq!(all.data.len(), 13);
        // Expired ban sorts first (earliest expiry)
        assert_eq!(all.data[0].target, "10.9.9.9");
    }

    #[tokio::test]
    async fn test_list_bans_rejects_bad_limit() {
        let (ctx, _bans) = test_context();
        let service = IpBanService::new(&ctx);

        let err = service
            .list_bans(
                &ListBansRequest {
                    limit: Some(0),
                    ..Default::default()
                },
                t0(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}

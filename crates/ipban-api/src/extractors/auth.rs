//! Requester identity extractor
//!
//! Combines the optional Bearer token with the ban gate's verdict into the
//! class the request is actually served as.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use ipban_core::value_objects::{Permissions, UserClass, UserId};
use ipban_service::{BanNotice, ServiceError};

use crate::middleware::GhostBan;
use crate::response::ApiError;
use crate::state::AppState;

/// Effective identity of the current request
///
/// Requests without an `Authorization` header are anonymous. A ghost ban
/// matched by the gate overrides whatever class the token grants.
#[derive(Debug, Clone)]
pub struct RequestUser {
    pub user_id: Option<UserId>,
    pub class: UserClass,
    /// Notice for the ghost ban that downgraded this request
    pub ban_notice: Option<BanNotice>,
}

impl RequestUser {
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            class: UserClass::Anonymous,
            ban_notice: None,
        }
    }

    #[inline]
    pub fn can(&self, permission: Permissions) -> bool {
        self.class.can(permission)
    }

    /// Require `permission` and a signed-in user
    ///
    /// # Errors
    /// Returns 403 when the effective class lacks the permission, or 401 when
    /// the request is not signed in at all.
    pub fn require(&self, permission: Permissions) -> Result<UserId, ApiError> {
        if !self.can(permission) {
            let name = permission.list().join(",");
            tracing::debug!(class = %self.class.as_str(), permission = %name, "Permission denied");
            return Err(ServiceError::permission_denied(name).into());
        }
        self.user_id
            .ok_or(ApiError::App(ipban_common::AppError::MissingAuth))
    }

    fn ghosted(mut self, ban: Option<&GhostBan>) -> Self {
        if let Some(GhostBan(notice)) = ban {
            self.class = UserClass::Ghost;
            self.ban_notice = Some(notice.clone());
        }
        self
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ghost = parts.extensions.get::<GhostBan>().cloned();

        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(Self::anonymous().ghosted(ghost.as_ref()));
        }

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InvalidAuthFormat)?;

        let app_state = AppState::from_ref(state);

        let claims = app_state
            .jwt_service()
            .validate_token(bearer.token())
            .map_err(|e| {
                tracing::warn!(error = %e, "Invalid access token");
                ApiError::App(e)
            })?;

        let user_id = claims.user_id().map_err(|e| {
            tracing::warn!(error = %e, "Invalid user ID in token");
            ApiError::App(e)
        })?;

        let user = Self {
            user_id: Some(user_id),
            class: claims.class,
            ban_notice: None,
        };
        Ok(user.ghosted(ghost.as_ref()))
    }
}

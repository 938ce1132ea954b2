//! IP ban handlers
//!
//! Ban management endpoints. All of them require the `BAN_IP` permission.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use ipban_core::value_objects::{BanId, Permissions};
use ipban_service::{
    BanListResponse, BanResponse, CreateBanRequest, IpBanService, ListBansRequest, ServiceError,
};

use crate::extractors::{RequestUser, ValidatedJson, ValidatedQuery};
use crate::response::{ApiError, ApiResult, Created, NoContent};
use crate::state::AppState;

/// List bans
///
/// GET /ip-bans?all=&limit=&offset=
pub async fn list_bans(
    State(state): State<AppState>,
    user: RequestUser,
    ValidatedQuery(request): ValidatedQuery<ListBansRequest>,
) -> ApiResult<Json<BanListResponse>> {
    user.require(Permissions::BAN_IP)?;

    let service = IpBanService::new(state.service_context());
    let response = service.list_bans(&request, Utc::now()).await?;
    Ok(Json(response))
}

/// Ban an address or range
///
/// POST /ip-bans
pub async fn create_ban(
    State(state): State<AppState>,
    user: RequestUser,
    ValidatedJson(request): ValidatedJson<CreateBanRequest>,
) -> ApiResult<Created<Json<BanResponse>>> {
    let admin = user.require(Permissions::BAN_IP)?;

    let service = IpBanService::new(state.service_context());
    let response = service.add_ban(admin, request, Utc::now()).await?;
    Ok(Created(Json(response)))
}

/// Remove a ban
///
/// DELETE /ip-bans/{ban_id}
pub async fn delete_ban(
    State(state): State<AppState>,
    user: RequestUser,
    Path(ban_id): Path<String>,
) -> ApiResult<NoContent> {
    user.require(Permissions::BAN_IP)?;

    let ban_id: BanId = ban_id
        .parse()
        .map_err(|_| ApiError::invalid_path("Invalid ban_id format"))?;

    let service = IpBanService::new(state.service_context());
    if service.remove_ban(ban_id).await? {
        Ok(NoContent)
    } else {
        Err(ServiceError::not_found("Ban", ban_id.to_string()).into())
    }
}

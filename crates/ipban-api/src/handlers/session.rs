//! Session handler

use axum::Json;
use ipban_service::SessionResponse;

use crate::extractors::RequestUser;

/// Effective identity of the caller, after the ban gate
///
/// GET /session
pub async fn get_session(user: RequestUser) -> Json<SessionResponse> {
    Json(SessionResponse::new(user.user_id, user.class, user.ban_notice))
}

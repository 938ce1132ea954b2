//! IP ban gate
//!
//! Runs the enforcement gate for the peer address of every request before it
//! reaches a handler.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use chrono::Utc;
use ipban_core::DomainError;
use ipban_service::{BanNotice, EnforcementGate, GateOutcome, ServiceError};
use tracing::{error, warn};

use crate::state::AppState;

/// Request extension set when the requester matched a ghost ban
///
/// Downstream extractors read it to downgrade the requester's class.
#[derive(Debug, Clone)]
pub struct GhostBan(pub BanNotice);

/// Axum middleware applying the ban gate
///
/// Blocked requesters get a 403 whose HTML body is the rendered notice.
/// Ghosted requests continue with a [`GhostBan`] extension attached. When the
/// ban data cannot be loaded the request is let through.
pub async fn ban_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let Some(ConnectInfo(peer)) = request.extensions().get::<ConnectInfo<SocketAddr>>().copied()
    else {
        warn!("No peer address on request, skipping ban check");
        return next.run(request).await;
    };

    let gate = EnforcementGate::new(state.service_context());
    match gate.enforce(&peer.ip().to_string(), Utc::now()).await {
        Ok(GateOutcome::Clear) => {}
        Ok(GateOutcome::Blocked(notice)) => {
            return (StatusCode::FORBIDDEN, Html(notice.message)).into_response();
        }
        Ok(GateOutcome::Ghosted(notice)) => {
            request.extensions_mut().insert(GhostBan(notice));
        }
        Err(ServiceError::Domain(DomainError::InvalidAddress(address))) => {
            warn!(%address, "Unparseable peer address, skipping ban check");
        }
        Err(e) => {
            error!(error = %e, peer = %peer.ip(), "Ban check failed, letting request through");
        }
    }

    next.run(request).await
}

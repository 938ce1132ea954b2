//! Request-time ban enforcement
//!
//! Classifies the requester's address against the cached index and decides
//! what happens to the request.

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

use ipban_core::entities::BanMode;
use ipban_core::index::{check, Verdict};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::notice::BanNotice;

/// What the gate decided for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// No ban applies
    Clear,
    /// The request must stop here with the notice as a 403 body
    Blocked(BanNotice),
    /// The request continues with the requester downgraded to ghost
    Ghosted(BanNotice),
}

impl GateOutcome {
    /// Whether request processing ends at the gate
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }

    pub fn notice(&self) -> Option<&BanNotice> {
        match self {
            Self::Clear => None,
            Self::Blocked(notice) | Self::Ghosted(notice) => Some(notice),
        }
    }
}

/// Ban enforcement gate
pub struct EnforcementGate<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> EnforcementGate<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Decide the outcome for a request from `address` at `now`
    ///
    /// # Errors
    /// Store failures while rebuilding the index or loading the matched ban
    /// are returned to the caller, which decides whether to let the request
    /// through.
    #[instrument(skip(self))]
    pub async fn enforce(&self, address: &str, now: DateTime<Utc>) -> ServiceResult<GateOutcome> {
        let index = self.ctx.ban_cache().get_index(now).await?;

        let ban_id = match check(address, &index)? {
            Verdict::Clear => return Ok(GateOutcome::Clear),
            Verdict::Banned(id) => id,
        };

        let Some(ban) = self.ctx.ban_repo().find_by_id(ban_id).await? else {
            warn!(%ban_id, "Matched ban no longer exists");
            return Ok(GateOutcome::Clear);
        };
        if !ban.is_active_at(now) {
            warn!(%ban_id, "Matched ban has already expired");
            return Ok(GateOutcome::Clear);
        }

        let admin = self.ctx.user_repo().find_name(ban.created_by).await?;
        let settings = self.ctx.settings();
        let message = settings.template.render(
            &ban,
            admin.as_deref(),
            settings.contact_link.as_deref(),
        );
        let notice = BanNotice::new(&ban, message);

        debug!(%ban_id, mode = %ban.mode, "Request matched a ban");

        Ok(match ban.mode {
            BanMode::Ghost => GateOutcome::Ghosted(notice),
            BanMode::Block | BanMode::Firewall => GateOutcome::Blocked(notice),
        })
    }
}

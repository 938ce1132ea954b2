//! Ban database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use ipban_core::entities::{Ban, BanListing, BanMode};
use ipban_core::value_objects::{BanId, UserId};

/// Database model for bans table
#[derive(Debug, Clone, FromRow)]
pub struct BanModel {
    pub id: i64,
    pub target: String,
    pub mode: String,
    pub reason: String,
    pub banner_id: i64,
    pub added_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// A bans row joined with the banner's name
#[derive(Debug, Clone, FromRow)]
pub struct BanListingModel {
    #[sqlx(flatten)]
    pub ban: BanModel,
    pub banner_name: Option<String>,
}

impl From<BanModel> for Ban {
    fn from(model: BanModel) -> Self {
        Ban {
            id: BanId::new(model.id),
            target: model.target,
            mode: BanMode::from_stored(&model.mode),
            reason: model.reason,
            created_by: UserId::new(model.banner_id),
            added_at: model.added_at,
            expires_at: model.expires_at,
        }
    }
}

impl From<BanListingModel> for BanListing {
    fn from(model: BanListingModel) -> Self {
        BanListing {
            ban: model.ban.into(),
            banner: model.banner_name,
        }
    }
}

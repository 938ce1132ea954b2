//! Database models
//!
//! Row shapes read with `sqlx::FromRow`, converted into domain entities.

mod ban;

pub use ban::{BanListingModel, BanModel};

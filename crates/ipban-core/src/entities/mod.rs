//! Domain entities - core business objects

mod ban;

pub use ban::{Ban, BanListing, BanMode, BanTarget, NewBan, RANGE_DELIMITER};

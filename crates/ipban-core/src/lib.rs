//! # ipban-core
//!
//! Domain layer containing ban entities, value objects, repository traits,
//! and the active-ban index with its matcher.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod index;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Ban, BanListing, BanMode, BanTarget, NewBan};
pub use error::DomainError;
pub use index::{
    normalize_address, normalize_network, BanIndex, BuildReport, SkippedBan, Verdict,
};
pub use traits::{BanQuery, BanRepository, RepoResult, UserRepository};
pub use value_objects::{BanId, IdParseError, Permissions, UserClass, UserId};

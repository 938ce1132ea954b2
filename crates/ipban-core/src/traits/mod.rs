//! Repository traits (ports)

mod repositories;

pub use repositories::{BanQuery, BanRepository, RepoResult, UserRepository};

//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in ipban-core.

mod ban;
mod error;
mod user;

pub use ban::PgBanRepository;
pub use user::PgUserRepository;

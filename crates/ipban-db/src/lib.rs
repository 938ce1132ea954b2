//! # ipban-db
//!
//! Database layer implementing the ban and user repository traits with PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! This crate provides PostgreSQL implementations for the repository traits
//! defined in `ipban-core`. It handles:
//!
//! - Connection pool management
//! - Database models with SQLx `FromRow` derives
//! - Repository implementations
//!
//! The `bans` and `users` tables belong to the board; this crate only reads and
//! writes them. `tests/fixtures/schema.sql` documents the expected shape.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ipban_db::{create_pool, DatabaseConfig, PgBanRepository};
//! use ipban_core::traits::BanRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env();
//!     let pool = create_pool(&config).await?;
//!     let bans = PgBanRepository::new(pool);
//!
//!     let active = bans.list_active(chrono::Utc::now()).await?;
//!     Ok(())
//! }
//! ```

pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, create_pool_from_env, DatabaseConfig, PgPool};
pub use repositories::{PgBanRepository, PgUserRepository};

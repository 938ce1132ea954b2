//! Axum extractors for request handling
//!
//! Custom extractors for the requester's effective identity and for
//! validated request input.

mod auth;
mod validated;

pub use auth::RequestUser;
pub use validated::{ValidatedJson, ValidatedQuery};

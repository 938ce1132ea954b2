//! Value objects - immutable types that represent domain concepts

mod ids;
mod permissions;

pub use ids::{BanId, IdParseError, UserId};
pub use permissions::{Permissions, UserClass};

//! Business logic services
//!
//! Ban management, the enforcement gate, and the shared service context.

pub mod context;
pub mod enforcement;
pub mod error;
pub mod ip_ban;
pub mod notice;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

// Re-export all services for convenience
pub use context::{IpBanSettings, ServiceContext, ServiceContextBuilder};
pub use enforcement::{EnforcementGate, GateOutcome};
pub use error::{ServiceError, ServiceResult};
pub use ip_ban::IpBanService;
pub use notice::{BanNotice, NoticeTemplate};

//! # ipban-service
//!
//! Application layer: ban management, the request-time enforcement gate,
//! notice rendering, and DTOs.

pub mod dto;
pub mod services;

pub use dto::{
    BanListResponse, BanResponse, CreateBanRequest, HealthChecks, HealthResponse,
    ListBansRequest, PaginationMeta, ReadinessResponse, SessionResponse,
};
pub use services::{
    BanNotice, EnforcementGate, GateOutcome, IpBanService, IpBanSettings, NoticeTemplate,
    ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
};

pub mod audit_service;
pub mod context;
pub mod discord;
pub mod license_service;

pub use audit_service::AuditService;
pub use context::RequestContext;
pub use license_service::{LicenseService, RevokeOutcome, RevokeTarget, RoleSyncReport, StatusView};

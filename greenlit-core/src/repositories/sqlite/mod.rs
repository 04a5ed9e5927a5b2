// src/repositories/sqlite/mod.rs

pub mod account;
pub mod audit_log;
pub mod redemption;

pub use self::account::SqliteAccountRepository;
pub use self::audit_log::SqliteAuditLogRepository;
pub use self::redemption::SqliteRedemptionRepository;

// src/repositories/mod.rs

pub mod sqlite;

pub use greenlit_common::traits::repository_traits::{
    AccountRepository, AuditLogRepository, RedemptionRepository,
};
pub use sqlite::{SqliteAccountRepository, SqliteAuditLogRepository, SqliteRedemptionRepository};

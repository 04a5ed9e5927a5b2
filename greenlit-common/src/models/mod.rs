// File: greenlit-common/src/models/mod.rs
pub mod account;
pub mod audit;
pub mod pending;
pub mod redemption;
pub mod settings;
pub mod system;

pub use account::Account;
pub use audit::{AuditAction, AuditEvent};
pub use pending::{GENERATED_LOCALLY, PendingGrant};
pub use redemption::{NewRedemption, Redemption};
pub use settings::LogSettings;
pub use system::{SystemCatalog, SystemDefinition};

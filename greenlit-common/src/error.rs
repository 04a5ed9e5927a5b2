// ================================================================
// File: greenlit-common/src/error.rs
// ================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not found error: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Parse(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Parse(s.to_string())
    }
}

/// User-facing failures of a command. Everything except `Internal` is shown
/// to the caller verbatim; `Internal` is logged and replaced by a generic reply.
#[derive(Debug, Error)]
pub enum LicenseError {
    // validation
    #[error("I don't recognize a system named **{0}**.")]
    UnknownSystem(String),

    #[error("Missing required option `{0}`.")]
    MissingOption(String),

    #[error("That command is restricted to administrators.")]
    AdminOnly,

    // not found
    #[error("That license key was not recognized or already redeemed.")]
    KeyNotRecognized,

    #[error("You haven't redeemed a license for **{0}**.")]
    NoRedemption(String),

    #[error("No Roblox ID is on record for you. Redeem a license with `/whitelist` first.")]
    NoIdentity,

    #[error("No user or license found with that identifier.")]
    TargetNotFound,

    #[error("That user has no active whitelist entries.")]
    NoEntries,

    #[error("That user does not have a whitelist for **{0}**.")]
    NoEntriesForSystem(String),

    #[error("That license belongs to **{license_system}**, not **{requested}**.")]
    SystemMismatch {
        license_system: String,
        requested: String,
    },

    // policy
    #[error("That license key has already been redeemed.")]
    AlreadyRedeemed,

    #[error("You must wait {days} more day(s) before changing your whitelist for **{system}**.")]
    CooldownActive { system: String, days: i64 },

    // remote
    #[error("Could not verify license right now. Please try again later.")]
    VerifierUnavailable,

    #[error("This license key is invalid or has already been used.")]
    KeyInvalid,

    #[error("Missing API key for the **{0}** group.")]
    MissingGroupCredential(String),

    #[error("Failed to accept join request for **{0}**. Roblox may not have registered it yet; please try again in a minute.")]
    JoinFailed(String),

    #[error("There was an error fetching your member profile. Please try again.")]
    MemberUnavailable,

    #[error("internal error: {0}")]
    Internal(#[from] Error),
}

impl LicenseError {
    /// True for failures whose detail must not reach the caller.
    pub fn is_internal(&self) -> bool {
        matches!(self, LicenseError::Internal(_))
    }
}

impl From<sqlx::Error> for LicenseError {
    fn from(e: sqlx::Error) -> Self {
        LicenseError::Internal(Error::Database(e))
    }
}

impl From<std::io::Error> for LicenseError {
    fn from(e: std::io::Error) -> Self {
        LicenseError::Internal(Error::Io(e))
    }
}

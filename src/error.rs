use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(rusqlite::Error),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("domain already exists: {0}")]
    DuplicateDomain(String),

    #[error("user already exists: {0}")]
    DuplicateUser(String),

    #[error("password cannot be empty")]
    EmptyPassword,

    #[error("invalid username or password")]
    BadCredentials,

    #[error("user is banned")]
    UserBanned,

    #[error("session expired")]
    SessionExpired,

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("session token collision")]
    TokenCollision,

    #[error("database schema already up-to-date at version {0}; no migration done")]
    AlreadyUpToDate(String),

    #[error("unknown schema version: {0}")]
    UnknownSchemaVersion(String),

    #[error("schema version mismatch: expected {expected}, found {}", .found.as_deref().unwrap_or("none"))]
    SchemaMismatch {
        expected: &'static str,
        found: Option<String>,
    },

    #[error("{0}")]
    InvalidName(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;

        match &e {
            rusqlite::Error::SqliteFailure(err, _)
                if matches!(
                    err.code,
                    ErrorCode::CannotOpen
                        | ErrorCode::DatabaseBusy
                        | ErrorCode::DatabaseLocked
                        | ErrorCode::NotADatabase
                ) =>
            {
                Error::StoreUnavailable(e.to_string())
            }
            _ => Error::Database(e),
        }
    }
}

/// True when the error is a UNIQUE/PRIMARY KEY constraint violation.
pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
                && matches!(
                    err.extended_code,
                    rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                )
    )
}

pub(crate) fn is_foreign_key_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}

pub type Result<T> = std::result::Result<T, Error>;

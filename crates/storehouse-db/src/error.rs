//! Storage-layer errors.
//!
//! Repositories and the invoice engine return [`DbError`]. Business-rule
//! refusals from `storehouse-core` travel through it unchanged as
//! [`DbError::Rejected`], so the API can still tell a caller mistake
//! (400/404) from a storage fault (500).

use storehouse_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// A lookup or update by id matched no row.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index refused the write (e.g. a second product with the
    /// same code).
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Refused by a rule in `storehouse-core`: insufficient stock, an
    /// unknown product or counterparty, a malformed draft.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// BEGIN or COMMIT did not go through.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether the caller's input caused this, as opposed to the store.
    ///
    /// The invoice engine rolls back on both, but only logs storage faults.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            DbError::Rejected(_)
                | DbError::NotFound { .. }
                | DbError::UniqueViolation { .. }
                | DbError::ForeignKeyViolation { .. }
        )
    }
}

const UNIQUE_PREFIX: &str = "UNIQUE constraint failed: ";
const FOREIGN_KEY_MESSAGE: &str = "FOREIGN KEY constraint failed";

/// Sorts a SQLite error message into a constraint variant.
///
/// SQLite reports the column as `table.column`; only the column is kept.
/// The offending value is not in the message, so callers that know it
/// (see `ProductRepository`) rebuild the error with [`DbError::duplicate`].
fn from_sqlite_message(message: &str) -> DbError {
    if let Some(target) = message.strip_prefix(UNIQUE_PREFIX) {
        let column = target.rsplit('.').next().unwrap_or(target);
        return DbError::duplicate(column, "unknown");
    }

    if message.contains(FOREIGN_KEY_MESSAGE) {
        return DbError::ForeignKeyViolation {
            message: message.to_string(),
        };
    }

    DbError::QueryFailed(message.to_string())
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),
            sqlx::Error::Database(db_err) => from_sqlite_message(db_err.message()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

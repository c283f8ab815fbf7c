//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repositories borrow an explicitly passed connection; there is no
//!   module-level store handle.
//! - "No matching row" is a value (`None` / `UpdateOutcome::NotFound`),
//!   never an error.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod post_repo;
pub mod tag_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Transport failure from the store: malformed statement, constraint
    /// violation, connection loss. Always propagated, never retried.
    Db(DbError),
    /// Persisted state that cannot be mapped back into a domain model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Outcome of a partial update.
///
/// The three cases are deliberately distinct: an empty patch is a no-op that
/// issues no statement, which callers must not confuse with a missing row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome<T> {
    /// The row matched and the patched fields were written.
    Updated(T),
    /// The patch carried no fields; nothing was sent to the store.
    NoFields,
    /// No row exists for the given id.
    NotFound,
}

impl<T> UpdateOutcome<T> {
    /// Returns the updated record, if any.
    pub fn updated(self) -> Option<T> {
        match self {
            Self::Updated(value) => Some(value),
            Self::NoFields | Self::NotFound => None,
        }
    }
}

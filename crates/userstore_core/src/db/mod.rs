//! SQLite connection bootstrap, table resolution and schema provisioning.
//!
//! # Responsibility
//! - Open and close the single SQLite connection owned by a session.
//! - Resolve which users table an operation targets.
//! - Provision and drop the users tables idempotently.
//!
//! # Invariants
//! - Table names are only ever produced by `TableTarget::table_name`.
//! - Store failures surface as `DbError::Connectivity` and are never retried.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;
pub mod table;

pub use open::{close_db, open_db, open_db_in_memory};
pub use schema::{drop_table, ensure_table, table_exists};
pub use table::TableTarget;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// The store is unreachable or rejected a statement. Fatal for callers.
    Connectivity(rusqlite::Error),
    InvalidConfig(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connectivity(err) => write!(f, "store error: {err}"),
            Self::InvalidConfig(message) => write!(f, "invalid store config: {message}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connectivity(err) => Some(err),
            Self::InvalidConfig(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Connectivity(value)
    }
}

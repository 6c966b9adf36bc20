//! User repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide add/get/list/delete over the users tables.
//! - Absorb uniqueness and validation rejections on the add path.
//!
//! # Invariants
//! - Every call resolves its table from the `TableTarget` it was given.
//! - The repository borrows a live connection and never opens or closes one.
//! - Only store failures are returned as `Err`; a missing row is `None` or a
//!   no-op and a duplicate email is reported, not raised.

use crate::db::{DbError, TableTarget};
use crate::model::user::{NewUser, User, UserId};
use log::{debug, info, warn};
use rusqlite::{params, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for user persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
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
        Self::Db(DbError::Connectivity(value))
    }
}

/// What happened to one insert attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(UserId),
    /// Another row in the same table already holds this email.
    DuplicateEmail,
    /// The payload failed validation and was never sent to the store.
    Invalid(String),
}

/// Repository interface for user CRUD operations.
pub trait UserRepository {
    /// Inserts a user, reporting (not returning) duplicate or invalid input.
    fn add_user(&self, name: &str, email: &str, target: TableTarget) -> RepoResult<()>;
    /// Inserts a user and tells the caller whether it was stored.
    fn insert_user(&self, user: &NewUser, target: TableTarget) -> RepoResult<InsertOutcome>;
    fn get_user(&self, id: UserId, target: TableTarget) -> RepoResult<Option<User>>;
    /// Lists every row in store scan order.
    fn list_users(&self, target: TableTarget) -> RepoResult<Vec<User>>;
    /// Deletes by id; a missing id is a silent no-op.
    fn delete_user(&self, id: UserId, target: TableTarget) -> RepoResult<()>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn add_user(&self, name: &str, email: &str, target: TableTarget) -> RepoResult<()> {
        let user = NewUser::new(name, email);
        match self.insert_user(&user, target)? {
            InsertOutcome::Inserted(id) => {
                info!(
                    "event=user_add module=repo status=ok table={} id={id}",
                    target.table_name()
                );
            }
            InsertOutcome::DuplicateEmail => {
                warn!(
                    "event=user_add module=repo status=rejected table={} reason=duplicate_email",
                    target.table_name()
                );
            }
            InsertOutcome::Invalid(reason) => {
                warn!(
                    "event=user_add module=repo status=rejected table={} reason=invalid_input detail={reason}",
                    target.table_name()
                );
            }
        }
        Ok(())
    }

    fn insert_user(&self, user: &NewUser, target: TableTarget) -> RepoResult<InsertOutcome> {
        if let Err(err) = user.validate() {
            return Ok(InsertOutcome::Invalid(err.to_string()));
        }

        let result = self.conn.execute(
            &format!(
                "INSERT INTO {} (name, email) VALUES (?1, ?2);",
                target.table_name()
            ),
            params![user.name.as_str(), user.email.as_str()],
        );

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted(self.conn.last_insert_rowid())),
            Err(err) if is_unique_violation(&err) => Ok(InsertOutcome::DuplicateEmail),
            Err(err) => Err(err.into()),
        }
    }

    fn get_user(&self, id: UserId, target: TableTarget) -> RepoResult<Option<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, name, email FROM {} WHERE id = ?1;",
            target.table_name()
        ))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }

    fn list_users(&self, target: TableTarget) -> RepoResult<Vec<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, name, email FROM {};",
            target.table_name()
        ))?;

        let mut rows = stmt.query([])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }

        Ok(users)
    }

    fn delete_user(&self, id: UserId, target: TableTarget) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1;", target.table_name()),
            [id],
        )?;

        debug!(
            "event=user_delete module=repo status=ok table={} id={id} changed={changed}",
            target.table_name()
        );
        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        }
        _ => false,
    }
}

//! Idempotent provisioning of the users tables.
//!
//! # Invariants
//! - Both tables share one shape: `id` autoincrement key, non-null non-empty
//!   `name`, non-null unique `email`.
//! - Statements run in autocommit mode; a successful return is durable.

use super::{DbResult, TableTarget};
use log::{debug, error, info};
use rusqlite::Connection;

/// Creates the target users table when it is absent.
///
/// Calling this on an already provisioned table is a no-op.
///
/// # Errors
/// - Returns `DbError::Connectivity` when the store rejects the statement.
pub fn ensure_table(conn: &Connection, target: TableTarget) -> DbResult<()> {
    let table = target.table_name();
    let sql = format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL CHECK (name <> ''),
            email TEXT NOT NULL UNIQUE
        );"
    );

    match conn.execute_batch(&sql) {
        Ok(()) => {
            info!("event=ensure_table module=db status=ok table={table}");
            Ok(())
        }
        Err(err) => {
            error!("event=ensure_table module=db status=error table={table} error={err}");
            Err(err.into())
        }
    }
}

/// Drops the target users table if it exists.
pub fn drop_table(conn: &Connection, target: TableTarget) -> DbResult<()> {
    let table = target.table_name();
    conn.execute_batch(&format!("DROP TABLE IF EXISTS {table};"))?;
    debug!("event=drop_table module=db status=ok table={table}");
    Ok(())
}

/// Returns whether the target users table is present.
pub fn table_exists(conn: &Connection, target: TableTarget) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [target.table_name()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

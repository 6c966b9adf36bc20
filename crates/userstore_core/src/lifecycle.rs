//! Scoped lifecycle for the isolated users table.
//!
//! # Responsibility
//! - Own one connection for the length of a verification run.
//! - Provision `users_test` before the run and drop it afterwards.
//!
//! # Invariants
//! - Once a session exists, teardown runs on every exit path: explicit
//!   `teardown`, normal drop, or unwinding from a panic.
//! - A failed table drop is reported and never prevents the connection close.
//! - The connection is closed exactly once.
//! - Only `TableTarget::Isolated` is provisioned or dropped here.

use crate::db::{close_db, drop_table, ensure_table, open_db, DbError, TableTarget};
use crate::repo::user_repo::SqliteUserRepository;
use crate::StoreConfig;
use log::{error, info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Per-run lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Provisioned,
    TornDown,
}

/// What teardown managed to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownReport {
    pub table_dropped: bool,
    /// Set when dropping the isolated table failed.
    pub drop_error: Option<String>,
    pub connection_closed: bool,
    pub close_error: Option<String>,
}

impl TeardownReport {
    pub fn is_clean(&self) -> bool {
        self.table_dropped && self.connection_closed && self.drop_error.is_none()
    }
}

/// Failure to start an isolated session.
#[derive(Debug)]
pub enum SessionError {
    /// The store could not be opened; nothing was acquired.
    Open(DbError),
    /// Provisioning failed after the session was armed; teardown already ran.
    Provision {
        source: DbError,
        teardown: TeardownReport,
    },
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(err) => write!(f, "cannot open isolated session: {err}"),
            Self::Provision { source, .. } => {
                write!(f, "cannot provision isolated table: {source}")
            }
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open(err) => Some(err),
            Self::Provision { source, .. } => Some(source),
        }
    }
}

/// Guard that provisions the isolated table and tears it down on release.
pub struct IsolatedSession {
    conn: Option<Connection>,
    state: LifecycleState,
}

impl IsolatedSession {
    /// Opens the configured store and provisions the isolated table.
    ///
    /// # Errors
    /// - `SessionError::Open` when the store is unreachable.
    /// - `SessionError::Provision` after tearing the session down.
    pub fn provision(config: &StoreConfig) -> Result<Self, SessionError> {
        let conn = open_db(&config.db_path).map_err(SessionError::Open)?;
        Self::from_connection(conn)
    }

    /// Takes ownership of an open connection and provisions the isolated table.
    pub fn from_connection(conn: Connection) -> Result<Self, SessionError> {
        let mut session = Self {
            conn: Some(conn),
            state: LifecycleState::Uninitialized,
        };

        // Teardown is armed from here on; a partial create still gets dropped.
        session.state = LifecycleState::Provisioned;
        if let Err(err) = ensure_table(session.conn(), TableTarget::Isolated) {
            error!("event=session_provision module=lifecycle status=error error={err}");
            let teardown = session.run_teardown();
            return Err(SessionError::Provision {
                source: err,
                teardown,
            });
        }

        info!("event=session_provision module=lifecycle status=ok");
        Ok(session)
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Connection shared by every operation of the run.
    pub fn conn(&self) -> &Connection {
        self.conn
            .as_ref()
            .expect("session connection is present until teardown")
    }

    pub fn repo(&self) -> SqliteUserRepository<'_> {
        SqliteUserRepository::new(self.conn())
    }

    /// Drops the isolated table and closes the connection.
    pub fn teardown(mut self) -> TeardownReport {
        self.run_teardown()
    }

    fn run_teardown(&mut self) -> TeardownReport {
        let mut report = TeardownReport::default();
        if self.state == LifecycleState::TornDown {
            return report;
        }
        self.state = LifecycleState::TornDown;

        let Some(conn) = self.conn.take() else {
            return report;
        };

        match drop_table(&conn, TableTarget::Isolated) {
            Ok(()) => report.table_dropped = true,
            Err(err) => {
                error!("event=session_teardown module=lifecycle status=error step=drop_table error={err}");
                report.drop_error = Some(err.to_string());
            }
        }

        match close_db(conn) {
            Ok(()) => report.connection_closed = true,
            Err(err) => {
                // SQLite frees the handle regardless; nothing is left to close.
                warn!("event=session_teardown module=lifecycle status=error step=close error={err}");
                report.close_error = Some(err.to_string());
                report.connection_closed = true;
            }
        }

        info!(
            "event=session_teardown module=lifecycle status=done table_dropped={} connection_closed={}",
            report.table_dropped, report.connection_closed
        );
        report
    }
}

impl Drop for IsolatedSession {
    fn drop(&mut self) {
        self.run_teardown();
    }
}

/// Runs `run` inside a provisioned isolated session and always tears down.
///
/// A panic in `run` still unwinds through the session guard, so the table is
/// dropped and the connection closed before the panic propagates.
pub fn run_isolated<T>(
    conn: Connection,
    run: impl FnOnce(&IsolatedSession) -> T,
) -> Result<(T, TeardownReport), SessionError> {
    let session = IsolatedSession::from_connection(conn)?;
    let output = run(&session);
    let report = session.teardown();
    Ok((output, report))
}

#[cfg(test)]
mod tests {
    use super::{run_isolated, IsolatedSession, LifecycleState};
    use crate::db::{open_db_in_memory, table_exists, TableTarget};

    #[test]
    fn session_is_provisioned_until_teardown() {
        let session = IsolatedSession::from_connection(open_db_in_memory().unwrap()).unwrap();

        assert_eq!(session.state(), LifecycleState::Provisioned);
        assert!(table_exists(session.conn(), TableTarget::Isolated).unwrap());
        assert!(!table_exists(session.conn(), TableTarget::Production).unwrap());

        let report = session.teardown();
        assert!(report.is_clean(), "{report:?}");
    }

    #[test]
    fn run_isolated_returns_closure_output_and_report() {
        let (count, report) = run_isolated(open_db_in_memory().unwrap(), |session| {
            session
                .conn()
                .query_row("SELECT COUNT(*) FROM users_test;", [], |row| {
                    row.get::<_, i64>(0)
                })
                .unwrap()
        })
        .unwrap();

        assert_eq!(count, 0);
        assert!(report.table_dropped);
        assert!(report.connection_closed);
    }
}

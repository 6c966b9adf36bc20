//! Console self-checks against the isolated users table.
//!
//! Each check runs in its own `IsolatedSession`, so every one starts from an
//! empty `users_test` and leaves nothing behind.

use std::io::{self, Write};
use userstore_core::db::open_db;
use userstore_core::{
    run_isolated, IsolatedSession, RepoResult, StoreConfig, TableTarget, UserRepository,
};

const TARGET: TableTarget = TableTarget::Isolated;

/// One selectable check: menu key, label, body.
pub struct Check {
    pub key: &'static str,
    pub label: &'static str,
    run: fn(&IsolatedSession) -> RepoResult<Result<(), String>>,
}

pub const CHECKS: &[Check] = &[
    Check {
        key: "1",
        label: "add then get returns the same user",
        run: check_add,
    },
    Check {
        key: "2",
        label: "get of an unknown id is absent",
        run: check_get_missing,
    },
    Check {
        key: "3",
        label: "delete then get is absent",
        run: check_delete,
    },
    Check {
        key: "4",
        label: "duplicate email keeps a single row",
        run: check_unique_email,
    },
    Check {
        key: "5",
        label: "list on a fresh table is empty",
        run: check_list_empty,
    },
];

pub const RUN_ALL_KEY: &str = "6";

pub fn print_menu(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Self-checks:")?;
    for check in CHECKS {
        writeln!(out, "{}) {}", check.key, check.label)?;
    }
    writeln!(out, "{RUN_ALL_KEY}) run all checks")
}

/// Runs the checks selected by `key`; returns `false` for an unknown key.
pub fn run_selected(config: &StoreConfig, key: &str, out: &mut impl Write) -> io::Result<bool> {
    let selected: Vec<&Check> = if key == RUN_ALL_KEY {
        CHECKS.iter().collect()
    } else {
        CHECKS.iter().filter(|check| check.key == key).collect()
    };
    if selected.is_empty() {
        return Ok(false);
    }

    let mut failures = 0;
    for check in selected {
        if !run_check(config, check, out)? {
            failures += 1;
        }
    }
    writeln!(out, "Self-check finished with {failures} failure(s).")?;
    Ok(true)
}

fn run_check(config: &StoreConfig, check: &Check, out: &mut impl Write) -> io::Result<bool> {
    let conn = match open_db(&config.db_path) {
        Ok(conn) => conn,
        Err(err) => {
            writeln!(out, "FAIL {}: could not connect: {err}", check.label)?;
            return Ok(false);
        }
    };

    let (verdict, report) = match run_isolated(conn, check.run) {
        Ok(run) => run,
        Err(err) => {
            writeln!(out, "FAIL {}: {err}", check.label)?;
            return Ok(false);
        }
    };

    let passed = match verdict {
        Ok(Ok(())) => {
            writeln!(out, "PASS {}", check.label)?;
            true
        }
        Ok(Err(detail)) => {
            writeln!(out, "FAIL {}: {detail}", check.label)?;
            false
        }
        Err(err) => {
            writeln!(out, "FAIL {}: store error: {err}", check.label)?;
            false
        }
    };
    if let Some(drop_error) = report.drop_error {
        writeln!(out, "  teardown could not drop the test table: {drop_error}")?;
    }
    Ok(passed)
}

fn check_add(session: &IsolatedSession) -> RepoResult<Result<(), String>> {
    let repo = session.repo();
    repo.add_user("Test User", "test@example.com", TARGET)?;

    let Some(stored) = repo.list_users(TARGET)?.into_iter().next() else {
        return Ok(Err("no row after add".to_string()));
    };
    match repo.get_user(stored.id, TARGET)? {
        Some(user) if user.name == "Test User" && user.email == "test@example.com" => Ok(Ok(())),
        other => Ok(Err(format!("get({}) returned {other:?}", stored.id))),
    }
}

fn check_get_missing(session: &IsolatedSession) -> RepoResult<Result<(), String>> {
    match session.repo().get_user(99_999, TARGET)? {
        None => Ok(Ok(())),
        Some(user) => Ok(Err(format!("unexpected row {user:?}"))),
    }
}

fn check_delete(session: &IsolatedSession) -> RepoResult<Result<(), String>> {
    let repo = session.repo();
    repo.add_user("Delete User", "delete@example.com", TARGET)?;
    let Some(stored) = repo.list_users(TARGET)?.into_iter().next() else {
        return Ok(Err("no row after add".to_string()));
    };

    repo.delete_user(stored.id, TARGET)?;
    match repo.get_user(stored.id, TARGET)? {
        None => Ok(Ok(())),
        Some(user) => Ok(Err(format!("row survived delete: {user:?}"))),
    }
}

fn check_unique_email(session: &IsolatedSession) -> RepoResult<Result<(), String>> {
    let repo = session.repo();
    repo.add_user("User A", "unique@example.com", TARGET)?;
    repo.add_user("User B", "unique@example.com", TARGET)?;

    let count = repo
        .list_users(TARGET)?
        .iter()
        .filter(|user| user.email == "unique@example.com")
        .count();
    if count == 1 {
        Ok(Ok(()))
    } else {
        Ok(Err(format!("{count} rows share the email")))
    }
}

fn check_list_empty(session: &IsolatedSession) -> RepoResult<Result<(), String>> {
    let users = session.repo().list_users(TARGET)?;
    if users.is_empty() {
        Ok(Ok(()))
    } else {
        Ok(Err(format!("{} unexpected row(s)", users.len())))
    }
}

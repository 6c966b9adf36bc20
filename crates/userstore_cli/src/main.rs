//! Interactive console over the userstore core.
//!
//! # Responsibility
//! - Own the production session connection and pass it to every command.
//! - Run the isolated self-checks, each on its own connection.
//!
//! # Invariants
//! - Only a failed initial connection ends the process with an error.
//! - Every other failure prints a message and returns to the menu.

use log::{error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use userstore_core::db::{close_db, ensure_table, open_db};
use userstore_core::{
    init_logging, InsertOutcome, NewUser, SqliteUserRepository, StoreConfig, TableTarget, User,
    UserRepository,
};

mod self_check;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("valid email regex"));

const MENU: &str = "
Menu:
1) Add user
2) Show user by id
3) List all users
4) Delete user
5) Run self-checks on the test table
6) Quit";

fn main() -> ExitCode {
    let config = match StoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = init_logging(&config.log_level, &config.log_dir.to_string_lossy()) {
        eprintln!("logging disabled: {err}");
    }

    let conn = match open_db(&config.db_path) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("cannot open {}: {err}", config.db_path.display());
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = ensure_table(&conn, TableTarget::Production) {
        eprintln!("cannot provision users table: {err}");
        if let Err(err) = close_db(conn) {
            eprintln!("error while closing the database: {err}");
        }
        return ExitCode::FAILURE;
    }
    info!("event=console_start module=cli status=ok");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let repo = SqliteUserRepository::new(&conn);
    let result = run_menu(&repo, &config, stdin.lock(), &mut stdout);
    drop(repo);

    if let Err(err) = close_db(conn) {
        eprintln!("error while closing the database: {err}");
    }
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=console_io module=cli status=error error={err}");
            ExitCode::FAILURE
        }
    }
}

fn run_menu(
    repo: &impl UserRepository,
    config: &StoreConfig,
    mut input: impl BufRead,
    out: &mut impl Write,
) -> io::Result<()> {
    loop {
        writeln!(out, "{MENU}")?;
        let Some(choice) = prompt(&mut input, out, "Choose an option: ")? else {
            return Ok(());
        };

        match choice.trim() {
            "1" => {
                let Some(name) = prompt(&mut input, out, "Name: ")? else {
                    return Ok(());
                };
                let Some(email) = prompt(&mut input, out, "Email: ")? else {
                    return Ok(());
                };
                if !EMAIL_RE.is_match(&email) {
                    writeln!(out, "Not added: `{email}` does not look like an email address.")?;
                    continue;
                }
                add_command(repo, &NewUser::new(name, email), out)?;
            }
            "2" => {
                let Some(id) = read_id(&mut input, out)? else {
                    continue;
                };
                match repo.get_user(id, TableTarget::Production) {
                    Ok(Some(user)) => print_user(out, &user)?,
                    Ok(None) => writeln!(out, "User not found.")?,
                    Err(err) => writeln!(out, "Lookup failed: {err}")?,
                }
            }
            "3" => match repo.list_users(TableTarget::Production) {
                Ok(users) if users.is_empty() => writeln!(out, "No users.")?,
                Ok(users) => {
                    for user in &users {
                        print_user(out, user)?;
                    }
                }
                Err(err) => writeln!(out, "Listing failed: {err}")?,
            },
            "4" => {
                let Some(id) = read_id(&mut input, out)? else {
                    continue;
                };
                match repo.delete_user(id, TableTarget::Production) {
                    Ok(()) => writeln!(out, "User {id} deleted (if it existed).")?,
                    Err(err) => writeln!(out, "Delete failed: {err}")?,
                }
            }
            "5" => {
                self_check::print_menu(out)?;
                let Some(key) = prompt(&mut input, out, "Choose a check: ")? else {
                    return Ok(());
                };
                if !self_check::run_selected(config, key.trim(), out)? {
                    writeln!(out, "Unknown check `{}`.", key.trim())?;
                }
            }
            "6" => {
                writeln!(out, "Bye.")?;
                return Ok(());
            }
            other => writeln!(out, "Unknown option `{other}`.")?,
        }
    }
}

fn add_command(
    repo: &impl UserRepository,
    user: &NewUser,
    out: &mut impl Write,
) -> io::Result<()> {
    match repo.insert_user(user, TableTarget::Production) {
        Ok(InsertOutcome::Inserted(id)) => writeln!(out, "User {} added with id {id}.", user.name),
        Ok(InsertOutcome::DuplicateEmail) => {
            writeln!(out, "Email {} is already registered.", user.email)
        }
        Ok(InsertOutcome::Invalid(reason)) => writeln!(out, "Not added: {reason}."),
        Err(err) => writeln!(out, "Add failed: {err}"),
    }
}

fn read_id(input: &mut impl BufRead, out: &mut impl Write) -> io::Result<Option<i64>> {
    let Some(raw) = prompt(input, out, "User id: ")? else {
        return Ok(None);
    };
    let raw = raw.trim();
    match raw.parse::<i64>() {
        Ok(id) => Ok(Some(id)),
        Err(_) => {
            writeln!(out, "`{raw}` is not a valid id.")?;
            Ok(None)
        }
    }
}

/// Returns the line without its terminator, or `None` at end of input.
fn prompt(
    input: &mut impl BufRead,
    out: &mut impl Write,
    label: &str,
) -> io::Result<Option<String>> {
    write!(out, "{label}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed_len = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed_len);
    Ok(Some(line))
}

fn print_user(out: &mut impl Write, user: &User) -> io::Result<()> {
    writeln!(out, "[{}] {} <{}>", user.id, user.name, user.email)
}

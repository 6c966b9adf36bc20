use userstore_core::db::{ensure_table, open_db_in_memory};
use userstore_core::{IsolatedSession, SqliteUserRepository, TableTarget, UserRepository};

#[test]
fn add_then_get_returns_stored_fields() {
    let session = IsolatedSession::from_connection(open_db_in_memory().unwrap()).unwrap();
    let repo = session.repo();

    repo.add_user("Test User", "test@example.com", TableTarget::Isolated)
        .unwrap();

    let user = repo.get_user(1, TableTarget::Isolated).unwrap().unwrap();
    assert_eq!(user.id, 1);
    assert_eq!(user.name, "Test User");
    assert_eq!(user.email, "test@example.com");
}

#[test]
fn get_unknown_id_returns_none() {
    let session = IsolatedSession::from_connection(open_db_in_memory().unwrap()).unwrap();

    let user = session.repo().get_user(99_999, TableTarget::Isolated).unwrap();
    assert!(user.is_none());
}

#[test]
fn delete_removes_user() {
    let session = IsolatedSession::from_connection(open_db_in_memory().unwrap()).unwrap();
    let repo = session.repo();

    repo.add_user("Delete User", "delete@example.com", TableTarget::Isolated)
        .unwrap();
    let id = repo.list_users(TableTarget::Isolated).unwrap()[0].id;

    repo.delete_user(id, TableTarget::Isolated).unwrap();
    assert!(repo.get_user(id, TableTarget::Isolated).unwrap().is_none());
}

#[test]
fn delete_unknown_id_is_noop() {
    let session = IsolatedSession::from_connection(open_db_in_memory().unwrap()).unwrap();
    let repo = session.repo();
    repo.add_user("Keep", "keep@example.com", TableTarget::Isolated)
        .unwrap();

    repo.delete_user(42, TableTarget::Isolated).unwrap();

    assert_eq!(repo.list_users(TableTarget::Isolated).unwrap().len(), 1);
}

#[test]
fn duplicate_email_add_returns_normally_and_keeps_one_row() {
    let session = IsolatedSession::from_connection(open_db_in_memory().unwrap()).unwrap();
    let repo = session.repo();

    repo.add_user("User A", "unique@example.com", TableTarget::Isolated)
        .unwrap();
    repo.add_user("User B", "unique@example.com", TableTarget::Isolated)
        .unwrap();

    let matching: Vec<_> = repo
        .list_users(TableTarget::Isolated)
        .unwrap()
        .into_iter()
        .filter(|user| user.email == "unique@example.com")
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].name, "User A");
}

#[test]
fn list_on_fresh_table_is_empty() {
    let session = IsolatedSession::from_connection(open_db_in_memory().unwrap()).unwrap();

    assert!(session
        .repo()
        .list_users(TableTarget::Isolated)
        .unwrap()
        .is_empty());
}

#[test]
fn list_returns_every_row() {
    let session = IsolatedSession::from_connection(open_db_in_memory().unwrap()).unwrap();
    let repo = session.repo();

    repo.add_user("A", "a@example.com", TableTarget::Isolated)
        .unwrap();
    repo.add_user("B", "b@example.com", TableTarget::Isolated)
        .unwrap();
    repo.add_user("C", "c@example.com", TableTarget::Isolated)
        .unwrap();

    let mut emails: Vec<_> = repo
        .list_users(TableTarget::Isolated)
        .unwrap()
        .into_iter()
        .map(|user| user.email)
        .collect();
    emails.sort();
    assert_eq!(emails, ["a@example.com", "b@example.com", "c@example.com"]);
}

#[test]
fn ids_are_not_reused_after_delete() {
    let session = IsolatedSession::from_connection(open_db_in_memory().unwrap()).unwrap();
    let repo = session.repo();

    repo.add_user("First", "first@example.com", TableTarget::Isolated)
        .unwrap();
    repo.delete_user(1, TableTarget::Isolated).unwrap();
    repo.add_user("Second", "second@example.com", TableTarget::Isolated)
        .unwrap();

    assert!(repo.get_user(1, TableTarget::Isolated).unwrap().is_none());
    let second = repo.get_user(2, TableTarget::Isolated).unwrap().unwrap();
    assert_eq!(second.name, "Second");
}

#[test]
fn tables_do_not_leak_into_each_other() {
    let conn = open_db_in_memory().unwrap();
    ensure_table(&conn, TableTarget::Production).unwrap();
    ensure_table(&conn, TableTarget::Isolated).unwrap();
    let repo = SqliteUserRepository::new(&conn);

    repo.add_user("Prod", "shared@example.com", TableTarget::Production)
        .unwrap();
    repo.add_user("Test", "shared@example.com", TableTarget::Isolated)
        .unwrap();
    repo.add_user("Only Test", "only-test@example.com", TableTarget::Isolated)
        .unwrap();

    let production = repo.list_users(TableTarget::Production).unwrap();
    let isolated = repo.list_users(TableTarget::Isolated).unwrap();

    assert_eq!(production.len(), 1);
    assert_eq!(production[0].name, "Prod");
    assert_eq!(isolated.len(), 2);
    assert!(isolated.iter().all(|user| user.name != "Prod"));

    repo.delete_user(production[0].id, TableTarget::Isolated)
        .unwrap();
    assert_eq!(repo.list_users(TableTarget::Production).unwrap().len(), 1);
}

#[test]
fn isolation_flag_selects_the_same_table_as_the_enum() {
    let conn = open_db_in_memory().unwrap();
    ensure_table(&conn, true.into()).unwrap();
    let repo = SqliteUserRepository::new(&conn);

    repo.add_user("Flagged", "flag@example.com", TableTarget::from(true))
        .unwrap();

    let user = repo.get_user(1, TableTarget::Isolated).unwrap().unwrap();
    assert_eq!(user.email, "flag@example.com");
    assert!(repo.list_users(TableTarget::from(false)).is_err());
}

#[test]
fn add_stores_name_and_email_exactly_as_given() {
    let session = IsolatedSession::from_connection(open_db_in_memory().unwrap()).unwrap();
    let repo = session.repo();

    repo.add_user(" Test User ", "test@example.com", TableTarget::Isolated)
        .unwrap();
    repo.add_user("Local", "admin", TableTarget::Isolated)
        .unwrap();

    let padded = repo.get_user(1, TableTarget::Isolated).unwrap().unwrap();
    assert_eq!(padded.name, " Test User ");
    let local = repo.get_user(2, TableTarget::Isolated).unwrap().unwrap();
    assert_eq!(local.name, "Local");
    assert_eq!(local.email, "admin");
}

#[test]
fn empty_name_add_is_absorbed() {
    let session = IsolatedSession::from_connection(open_db_in_memory().unwrap()).unwrap();
    let repo = session.repo();

    repo.add_user("", "nobody@example.com", TableTarget::Isolated)
        .unwrap();

    assert!(repo.list_users(TableTarget::Isolated).unwrap().is_empty());
}

#[test]
fn reads_return_rows_from_tables_created_without_the_name_check() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE users_test (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE
        );
        INSERT INTO users_test (name, email) VALUES ('', 'e@example.com');
        INSERT INTO users_test (name, email) VALUES ('Ok', 'ok@example.com');",
    )
    .unwrap();
    ensure_table(&conn, TableTarget::Isolated).unwrap();
    let repo = SqliteUserRepository::new(&conn);

    let users = repo.list_users(TableTarget::Isolated).unwrap();
    assert_eq!(users.len(), 2);
    let blank = repo.get_user(1, TableTarget::Isolated).unwrap().unwrap();
    assert_eq!(blank.name, "");
    assert_eq!(blank.email, "e@example.com");
}

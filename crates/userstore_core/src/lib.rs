//! Core persistence for the userstore.
//! Users live in a production table and an isolated test table; every
//! operation names the table it acts on through `TableTarget`.

pub mod config;
pub mod db;
pub mod lifecycle;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::StoreConfig;
pub use db::{DbError, DbResult, TableTarget};
pub use lifecycle::{
    run_isolated, IsolatedSession, LifecycleState, SessionError, TeardownReport,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::user::{NewUser, User, UserId, UserValidationError};
pub use repo::user_repo::{
    InsertOutcome, RepoError, RepoResult, SqliteUserRepository, UserRepository,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

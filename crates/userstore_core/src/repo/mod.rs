//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for users.
//! - Isolate SQLite query details from callers (console, lifecycle, tests).
//!
//! # Invariants
//! - Repository writes validate `NewUser` before persistence.
//! - Absence is a value (`None`), never an error.

pub mod user_repo;

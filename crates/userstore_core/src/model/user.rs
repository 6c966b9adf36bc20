//! User domain model.
//!
//! # Responsibility
//! - Define the stored `User` record and the `NewUser` insert payload.
//!
//! # Invariants
//! - `name` is non-empty; values are stored exactly as given.
//! - `email` uniqueness is enforced by the store, not here.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned row identifier.
pub type UserId = i64;

/// One row of a users table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// Insert payload; the id is assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

/// Validation failures for `NewUser`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyName,
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
        }
    }
}

impl Error for UserValidationError {}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn validate(&self) -> Result<(), UserValidationError> {
        if self.name.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        Ok(())
    }
}

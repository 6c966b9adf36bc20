//! Domain model for stored users.
//!
//! # Responsibility
//! - Define the record returned by repository reads.
//! - Define and validate the payload accepted by repository inserts.
//!
//! # Invariants
//! - `UserId` values are assigned by the store and never reused in a table.
//! - Users are immutable once stored; deletion is the only lifecycle step.

pub mod user;

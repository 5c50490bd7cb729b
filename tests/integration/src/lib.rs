//! Integration test utilities for numhub
//!
//! These helpers target a real PostgreSQL database. Tests skip silently
//! when `DATABASE_URL` is not set, so the suite stays runnable on machines
//! without a database.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;

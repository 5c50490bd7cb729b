//! # numhub-db
//!
//! Database layer implementing the repository traits with PostgreSQL via
//! SQLx.
//!
//! ## Overview
//!
//! This crate provides PostgreSQL implementations for all repository traits
//! defined in `numhub-core`. It handles:
//!
//! - Connection pool management (bounded acquire timeout)
//! - Database models with SQLx `FromRow` derives
//! - Model -> entity mappers
//! - Repository implementations, including every transactional
//!   multi-statement mutation (ledger, PRO lifecycle, broadcast progress,
//!   retention purge)
//!
//! All operands - including durations, expiry timestamps, and purge
//! cutoffs - are bound as query parameters; timestamps are computed once in
//! application code and passed through.
//!
//! ## Expected schema
//!
//! Schema bootstrapping is handled externally. The repositories expect
//! these tables: `users`, `countries`, `numbers` (unique on
//! `(country_id, digits)`), `settings`, `mandatory_channels`, `proofs`,
//! `advertisements`, `points_history`, `pro_subscriptions`,
//! `broadcast_runs`, `audit_log`.

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, DatabaseConfig, PgPool};
pub use repositories::{
    PgAdvertisementRepository, PgBroadcastRepository, PgChannelRepository, PgCountryRepository,
    PgLedgerRepository, PgMaintenanceRepository, PgNumberRepository, PgProofRepository,
    PgSettingsRepository, PgUserRepository,
};

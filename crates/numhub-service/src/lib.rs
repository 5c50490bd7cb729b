//! # numhub-service
//!
//! Application services composing the repository ports, the in-process
//! caches, and the messaging gateway:
//!
//! - catalog, settings, and per-user stats served through the TTL cache
//! - the points/PRO ledger with its invalidation discipline
//! - random number selection and membership gating
//! - the resumable, cancellable broadcast engine
//! - the background sweeper tasks

pub mod services;
pub mod tasks;

pub use services::{
    BroadcastService, CatalogService, ImportStats, LedgerService, MembershipService,
    NumberService, OnboardOutcome, ProofService, ServiceContext, ServiceError, ServiceResult,
    SessionService, SettingsService, ThrottleService, UserFlow, UserService,
};
pub use tasks::SweeperSet;

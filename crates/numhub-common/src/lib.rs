//! # numhub-common
//!
//! Cross-cutting concerns shared by every layer: environment-driven
//! configuration, the application-wide error type, and tracing setup.

pub mod config;
pub mod error;
pub mod telemetry;

pub use config::{AppConfig, ConfigError};
pub use error::AppError;
pub use telemetry::{init_tracing, try_init_tracing, TracingConfig};

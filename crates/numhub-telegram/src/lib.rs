//! # numhub-telegram
//!
//! `MessagingGateway` implementation over the Telegram Bot HTTP API.
//!
//! The core only knows the trait in `numhub-core`; this crate is injected
//! at assembly time. Any non-success API response surfaces as a
//! `GatewayError` for the caller to count - there are no inline retries.

mod client;
mod types;

pub use client::TelegramGateway;

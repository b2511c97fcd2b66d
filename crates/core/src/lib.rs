//! Core types and shared functionality for pagefetch.
//!
//! This crate provides:
//! - In-memory TTL cache for extracted payloads
//! - SQLite-backed render log (last rendered document)
//! - Response envelope types
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod envelope;
pub mod error;
pub mod render_log;

pub use cache::PayloadCache;
pub use config::{AppConfig, ConfigError};
pub use envelope::ResponseEnvelope;
pub use error::Error;
pub use render_log::{LastRender, RenderLogDb};

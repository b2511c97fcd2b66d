//! In-memory TTL cache for extracted page payloads.
//!
//! Entries are keyed by URL and expire a fixed time after insertion. Expired
//! entries are dropped lazily on read and periodically by a background sweeper.

pub mod payload;
pub mod sweep;

pub use payload::{DEFAULT_PAYLOAD_TTL, PayloadCache};
pub use sweep::{DEFAULT_SWEEP_INTERVAL, spawn_sweeper};

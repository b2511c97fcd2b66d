//! Durable single-slot storage for the last rendered document.
//!
//! Backed by SQLite with async access via tokio-rusqlite. Each write replaces
//! the previous document; reading before any write yields `None`.

pub mod connection;
pub mod migrations;
pub mod slot;

pub use crate::Error;

pub use connection::RenderLogDb;
pub use slot::LastRender;

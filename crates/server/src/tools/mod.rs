//! MCP tool implementations.
//!
//! This module contains all tools exposed by the pagefetch server.

pub mod get_page;

pub use get_page::GetPageParams;

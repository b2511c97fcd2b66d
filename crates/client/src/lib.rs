//! Client code for pagefetch.
//!
//! This crate provides the HTTP transport, headless rendering, payload
//! extraction, response normalization and the dispatcher that ties them
//! together for the server.

pub mod dispatch;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod render;

pub use dispatch::{Dispatcher, Format, RetrievalRequest, Strategy};
pub use extract::{EMPTY_PAYLOAD, extract_payload};
pub use fetch::{FetchClient, FetchConfig, FetchResponse, TransportError};
#[cfg(feature = "render")]
pub use render::HeadlessRenderer;
pub use render::{BrowserSettings, DisabledRenderer, RenderError, RenderOptions, RenderSession, RenderedDocument, Renderer};

pub use reqwest::Method;

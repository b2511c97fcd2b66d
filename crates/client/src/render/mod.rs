//! Headless browser rendering for script-assembled pages.
//!
//! This module provides the renderer trait, the bounded [`RenderSession`] in
//! front of it, and a feature-gated implementation using chromiumoxide.
//!
//! ### Isolation
//! - Every render launches its own browser with a throwaway profile; nothing
//!   is pooled or reused across calls.
//!
//! ### Request filtering
//! - Sub-resources classified as media, font, image or stylesheet are aborted;
//!   everything else (documents, scripts, XHR, ...) is allowed through.

#[cfg(feature = "render")]
pub mod chromium;
pub mod session;
pub mod stealth;

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[cfg(feature = "render")]
pub use chromium::HeadlessRenderer;
pub use session::RenderSession;

/// Errors that can occur during page rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Rendering is turned off or not compiled in.
    #[error("render mode is disabled")]
    Disabled,

    /// Failed to launch or connect to browser.
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    /// Failed to set up the page before navigating.
    #[error("page setup failed: {0}")]
    PageSetup(String),

    /// Failed to navigate to URL.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Failed to get page content.
    #[error("content retrieval failed: {0}")]
    ContentRetrieval(String),

    /// Timeout waiting for the render to finish.
    #[error("render timeout after {0}ms")]
    Timeout(u64),

    /// The render pool was shut down.
    #[error("render pool closed")]
    PoolClosed,
}

/// Options for rendering a page.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Upper bound on launch, navigation and serialization (default: 30000).
    pub timeout_ms: u64,

    /// Viewport dimensions (default: 800x600).
    pub viewport: (u32, u32),
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { timeout_ms: 30000, viewport: (800, 600) }
    }
}

impl RenderOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Browser launch settings.
#[derive(Debug, Clone, Default)]
pub struct BrowserSettings {
    /// Chrome/Chromium binary; chromiumoxide auto-detects when `None`.
    pub executable: Option<PathBuf>,
}

/// Result of rendering a page.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// Serialized `outerHTML` of the root element after scripts ran.
    pub html: String,

    /// Final URL after redirects.
    pub final_url: Url,

    /// Time taken to render in milliseconds.
    pub render_time_ms: u64,
}

/// Resource class assigned by the browser to a sub-resource request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceClass {
    Document,
    Stylesheet,
    Image,
    Media,
    Font,
    Script,
    Xhr,
    Fetch,
    Other,
}

/// Resource classes aborted during a render.
pub const BLOCKED_RESOURCES: &[ResourceClass] =
    &[ResourceClass::Media, ResourceClass::Font, ResourceClass::Image, ResourceClass::Stylesheet];

impl ResourceClass {
    /// Whether requests of this class are aborted.
    pub fn is_blocked(self) -> bool {
        BLOCKED_RESOURCES.contains(&self)
    }
}

/// Renderer trait for headless browser page rendering.
#[async_trait::async_trait]
pub trait Renderer: Send + Sync {
    /// Render a URL to its serialized DOM.
    ///
    /// Implementations must release every browser resource they acquired
    /// before returning, on success and on failure.
    async fn render(&self, url: &Url, opts: &RenderOptions) -> Result<RenderedDocument, RenderError>;
}

/// Renderer used when rendering is disabled by configuration or features.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledRenderer;

#[async_trait::async_trait]
impl Renderer for DisabledRenderer {
    async fn render(&self, _url: &Url, _opts: &RenderOptions) -> Result<RenderedDocument, RenderError> {
        Err(RenderError::Disabled)
    }
}

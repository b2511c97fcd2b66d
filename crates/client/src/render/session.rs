//! Bounded access to a [`Renderer`].
//!
//! A semaphore caps how many browsers run at once; callers past the cap wait
//! for a permit rather than launching another process.

use super::{RenderError, RenderOptions, RenderedDocument, Renderer};
use pagefetch_core::RenderLogDb;
use std::sync::Arc;
use tokio::sync::Semaphore;
use url::Url;

/// Renderer shared by all retrievals, with a concurrency cap and the render log.
#[derive(Clone)]
pub struct RenderSession {
    renderer: Arc<dyn Renderer>,
    permits: Arc<Semaphore>,
    options: RenderOptions,
    log: RenderLogDb,
}

impl RenderSession {
    /// Wrap `renderer`, allowing at most `max_concurrent` renders in flight.
    pub fn new(renderer: Arc<dyn Renderer>, max_concurrent: usize, options: RenderOptions, log: RenderLogDb) -> Self {
        Self { renderer, permits: Arc::new(Semaphore::new(max_concurrent.max(1))), options, log }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render `url`, waiting for a free slot first.
    ///
    /// With `persist` set, a successful render is also written to the render
    /// log. A failed write is logged and does not fail the render.
    pub async fn render(&self, url: &Url, persist: bool) -> Result<RenderedDocument, RenderError> {
        let _permit = self.permits.acquire().await.map_err(|_| RenderError::PoolClosed)?;

        let document = self.renderer.render(url, &self.options).await?;

        if persist
            && let Err(e) = self.log.write_last_render(url.as_str(), &document.html).await
        {
            tracing::warn!("failed to persist render of {}: {}", url, e);
        }

        Ok(document)
    }

    /// Stop handing out permits; pending and later renders fail with [`RenderError::PoolClosed`].
    pub fn close(&self) {
        self.permits.close();
    }
}

//! Chromium renderer using chromiumoxide.
//!
//! Each call launches a fresh headless browser with its own temporary profile,
//! renders one page, then closes the browser and reaps the process. Teardown
//! also runs when navigation fails or the render timeout fires.

use super::stealth::{EVASION_SCRIPTS, launch_args};
use super::{BrowserSettings, RenderError, RenderOptions, RenderedDocument, Renderer, ResourceClass};
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams, RequestPattern, RequestStage,
};
use chromiumoxide::cdp::browser_protocol::network::{ErrorReason, ResourceType};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::handler::viewport::Viewport;
use futures_util::StreamExt;
use std::time::Instant;
use url::Url;

/// Headless Chrome/Chromium renderer.
#[derive(Debug, Clone, Default)]
pub struct HeadlessRenderer {
    settings: BrowserSettings,
}

impl HeadlessRenderer {
    /// Create a renderer. No browser is started until [`Renderer::render`] runs.
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    fn browser_config(&self, opts: &RenderOptions, profile: &std::path::Path) -> Result<BrowserConfig, RenderError> {
        let (width, height) = opts.viewport;
        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile)
            .window_size(width, height)
            .viewport(Some(Viewport { width, height, ..Default::default() }))
            .args(launch_args());

        if let Some(executable) = &self.settings.executable {
            builder = builder.chrome_executable(executable);
        }

        builder.build().map_err(RenderError::BrowserLaunch)
    }
}

#[async_trait::async_trait]
impl Renderer for HeadlessRenderer {
    async fn render(&self, url: &Url, opts: &RenderOptions) -> Result<RenderedDocument, RenderError> {
        let start = Instant::now();

        let profile = tempfile::Builder::new()
            .prefix("pagefetch-profile-")
            .tempdir()
            .map_err(|e| RenderError::BrowserLaunch(format!("failed to create profile dir: {e}")))?;
        let config = self.browser_config(opts, profile.path())?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::BrowserLaunch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {e}");
                }
            }
        });

        let outcome = tokio::time::timeout(opts.timeout(), navigate(&browser, url)).await;

        if let Err(e) = browser.close().await {
            tracing::debug!("browser close failed: {e}");
        }
        if let Err(e) = browser.wait().await {
            tracing::debug!("browser wait failed: {e}");
        }
        handler_task.abort();
        drop(profile);

        let (html, final_url) = match outcome {
            Ok(result) => result?,
            Err(_) => return Err(RenderError::Timeout(opts.timeout_ms)),
        };

        let render_time_ms = start.elapsed().as_millis() as u64;
        tracing::debug!("rendered {} in {}ms ({} bytes)", final_url, render_time_ms, html.len());

        Ok(RenderedDocument { html, final_url, render_time_ms })
    }
}

/// Open a page, install interception and evasions, navigate and serialize.
async fn navigate(browser: &Browser, url: &Url) -> Result<(String, Url), RenderError> {
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| RenderError::PageSetup(e.to_string()))?;

    for script in EVASION_SCRIPTS {
        page.execute(AddScriptToEvaluateOnNewDocumentParams::new(*script))
            .await
            .map_err(|e| RenderError::PageSetup(e.to_string()))?;
    }

    let interceptor = intercept_requests(&page).await?;

    let result = async {
        page.goto(url.as_str())
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        let html: String = page
            .evaluate("document.documentElement.outerHTML")
            .await
            .map_err(|e| RenderError::ContentRetrieval(e.to_string()))?
            .into_value()
            .map_err(|e| RenderError::ContentRetrieval(e.to_string()))?;

        let page_url = page
            .url()
            .await
            .map_err(|e| RenderError::ContentRetrieval(e.to_string()))?;
        let final_url = page_url
            .as_deref()
            .and_then(|u| Url::parse(u).ok())
            .unwrap_or_else(|| url.clone());

        Ok((html, final_url))
    }
    .await;

    interceptor.abort();
    page.close().await.ok();
    result
}

/// Pause every request and abort those whose resource class is blocked.
async fn intercept_requests(page: &Page) -> Result<tokio::task::JoinHandle<()>, RenderError> {
    let mut paused = page
        .event_listener::<EventRequestPaused>()
        .await
        .map_err(|e| RenderError::PageSetup(e.to_string()))?;

    page.execute(
        EnableParams::builder()
            .pattern(RequestPattern::builder().url_pattern("*").request_stage(RequestStage::Request).build())
            .build(),
    )
    .await
    .map_err(|e| RenderError::PageSetup(e.to_string()))?;

    let page = page.clone();
    Ok(tokio::spawn(async move {
        while let Some(event) = paused.next().await {
            let class = classify(&event.resource_type);
            let result = if class.is_blocked() {
                page.execute(FailRequestParams::new(event.request_id.clone(), ErrorReason::BlockedByClient))
                    .await
                    .map(|_| ())
            } else {
                page.execute(ContinueRequestParams::new(event.request_id.clone()))
                    .await
                    .map(|_| ())
            };

            if let Err(e) = result {
                tracing::debug!("request interception for {:?} failed: {e}", class);
            }
        }
    }))
}

fn classify(resource_type: &ResourceType) -> ResourceClass {
    match resource_type {
        ResourceType::Document => ResourceClass::Document,
        ResourceType::Stylesheet => ResourceClass::Stylesheet,
        ResourceType::Image => ResourceClass::Image,
        ResourceType::Media => ResourceClass::Media,
        ResourceType::Font => ResourceClass::Font,
        ResourceType::Script => ResourceClass::Script,
        ResourceType::Xhr => ResourceClass::Xhr,
        ResourceType::Fetch => ResourceClass::Fetch,
        _ => ResourceClass::Other,
    }
}

//! Request classification and routing.
//!
//! [`Dispatcher::retrieve`] never fails: every error is folded into a
//! [`ResponseEnvelope`] or a payload sentinel before it reaches the caller.
//!
//! ### Routing (first match wins)
//! 1. `info` format or `HEAD` method → probe
//! 2. `raw` → undecoded body
//! 3. `vilos` / `viloslog` → render, extract, cache
//! 4. `lastlog` → last persisted render
//! 5. anything else → decoded body with status

use crate::extract::{EMPTY_PAYLOAD, extract_payload};
use crate::fetch::{FetchClient, TransportError, parse_target};
use crate::normalize;
use crate::render::RenderSession;
use pagefetch_core::envelope::EMPTY_LAST_LOG;
use pagefetch_core::{PayloadCache, RenderLogDb, ResponseEnvelope};
use reqwest::{Method, Url};
use std::fmt;
use std::sync::Arc;

/// Requested response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Full decoded contents with status.
    #[default]
    None,
    Info,
    Raw,
    /// Rendered player configuration, served from cache when fresh.
    Vilos,
    /// Like `Vilos`, but always re-renders and persists the rendered page.
    VilosLog,
    LastLog,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::None => "none",
            Format::Info => "info",
            Format::Raw => "raw",
            Format::Vilos => "vilos",
            Format::VilosLog => "viloslog",
            Format::LastLog => "lastlog",
        }
    }
}

impl From<&str> for Format {
    /// Case-insensitive; unrecognized names select the default strategy.
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Format::Info,
            "raw" => Format::Raw,
            "vilos" => Format::Vilos,
            "viloslog" => Format::VilosLog,
            "lastlog" => Format::LastLog,
            _ => Format::None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single retrieval call.
#[derive(Debug, Clone)]
pub struct RetrievalRequest {
    pub url: String,
    pub format: Format,
    pub method: Method,
}

impl RetrievalRequest {
    pub fn new(url: impl Into<String>, format: Format, method: Method) -> Self {
        Self { url: url.into(), format, method }
    }
}

/// Retrieval strategy chosen for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Probe,
    Raw,
    RenderedPayload { persist: bool },
    LastLog,
    Contents,
}

impl Strategy {
    /// Pick the strategy for `request`.
    pub fn classify(request: &RetrievalRequest) -> Self {
        if request.format == Format::Info || request.method == Method::HEAD {
            return Strategy::Probe;
        }
        match request.format {
            Format::Raw => Strategy::Raw,
            Format::Vilos => Strategy::RenderedPayload { persist: false },
            Format::VilosLog => Strategy::RenderedPayload { persist: true },
            Format::LastLog => Strategy::LastLog,
            Format::None | Format::Info => Strategy::Contents,
        }
    }
}

/// Routes retrieval requests to the fetcher, the render session and the stores.
pub struct Dispatcher {
    fetcher: FetchClient,
    renderer: RenderSession,
    cache: Arc<PayloadCache>,
    log: RenderLogDb,
}

impl Dispatcher {
    pub fn new(fetcher: FetchClient, renderer: RenderSession, cache: Arc<PayloadCache>, log: RenderLogDb) -> Self {
        Self { fetcher, renderer, cache, log }
    }

    /// Run `request` and return its envelope.
    pub async fn retrieve(&self, request: &RetrievalRequest) -> ResponseEnvelope {
        let strategy = Strategy::classify(request);
        tracing::debug!("{} {} ({}) -> {:?}", request.method, request.url, request.format, strategy);

        if strategy == Strategy::LastLog {
            return self.last_log().await;
        }

        let url = match parse_target(&request.url) {
            Ok(url) => url,
            Err(e) => return normalize::failure(TransportError::InvalidUrl(e)),
        };

        match strategy {
            Strategy::Probe => normalize::info(&request.url, self.fetcher.fetch(&url, Method::HEAD, false).await),
            Strategy::Raw => normalize::raw(self.fetcher.fetch(&url, request.method.clone(), true).await),
            Strategy::Contents => {
                normalize::contents(&request.url, self.fetcher.fetch(&url, request.method.clone(), false).await)
            }
            Strategy::RenderedPayload { persist } => self.rendered_payload(&url, persist).await,
            Strategy::LastLog => self.last_log().await,
        }
    }

    async fn rendered_payload(&self, url: &Url, persist: bool) -> ResponseEnvelope {
        let key = url.as_str();

        if !persist
            && let Some(payload) = self.cache.get(key).await
        {
            tracing::debug!("payload cache hit for {}", key);
            return ResponseEnvelope::Payload(payload);
        }

        let document = match self.renderer.render(url, persist).await {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("render of {} failed: {}", url, e);
                return ResponseEnvelope::Payload(EMPTY_PAYLOAD.to_string());
            }
        };

        if document.html.is_empty() {
            tracing::warn!("render of {} produced an empty document", url);
            return ResponseEnvelope::Payload(EMPTY_PAYLOAD.to_string());
        }

        let payload = extract_payload(&document.html);
        self.cache.set(key, payload.clone()).await;
        ResponseEnvelope::Payload(payload)
    }

    async fn last_log(&self) -> ResponseEnvelope {
        match self.log.last_render().await {
            Ok(Some(last)) => ResponseEnvelope::Payload(last.document),
            Ok(None) => ResponseEnvelope::Payload(EMPTY_LAST_LOG.to_string()),
            Err(e) => {
                tracing::warn!("failed to read render log: {}", e);
                ResponseEnvelope::Payload(EMPTY_LAST_LOG.to_string())
            }
        }
    }
}

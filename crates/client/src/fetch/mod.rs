//! HTTP transport for the probe, raw and contents strategies.
//!
//! ### Decoding
//! - Two reqwest clients share one configuration: one decodes gzip/brotli/deflate
//!   bodies, the other leaves `Content-Encoding` untouched for raw retrieval.
//!
//! ### Status handling
//! - Non-2xx responses are read in full and returned as
//!   [`TransportError::HttpStatus`], so the body is never discarded.
//! - HEAD requests never read a body and never decode, since reqwest drops
//!   `content-length` from responses it decompresses.
//!
//! ### Lengths
//! - Body length is always the buffer length; the declared `content-length`
//!   is kept separately for metadata probes.

pub mod error;
pub mod url;

use bytes::Bytes;
use reqwest::{Client, Method, StatusCode, Url, header};
use std::time::{Duration, Instant};

pub use error::{ConnectionKind, TransportError};
pub use self::url::{UrlError, parse_target};

use pagefetch_core::{AppConfig, Error};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "pagefetch/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 10)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "pagefetch/0.1".to_string(), timeout: Duration::from_millis(20000), max_redirects: 10 }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout(), max_redirects: config.max_redirects }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The URL requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Content-Length header as declared by the server
    pub declared_length: Option<u64>,
    /// Response body bytes (empty for HEAD)
    pub bytes: Bytes,
    /// Response headers
    pub headers: header::HeaderMap,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// HTTP fetch client.
pub struct FetchClient {
    decoding: Client,
    raw: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let decoding = Self::builder(&config)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpClient(format!("failed to build HTTP client: {}", e)))?;

        let raw = Self::builder(&config)
            .gzip(false)
            .brotli(false)
            .deflate(false)
            .build()
            .map_err(|e| Error::HttpClient(format!("failed to build raw HTTP client: {}", e)))?;

        Ok(Self { decoding, raw, config })
    }

    fn builder(config: &FetchConfig) -> reqwest::ClientBuilder {
        Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
    }

    /// Perform a single request against `url`.
    ///
    /// With `raw` set the body is returned exactly as received on the wire.
    /// `HEAD` returns status and headers only, and always goes through the
    /// non-decoding client so `content-length` is left in place.
    pub async fn fetch(&self, url: &Url, method: Method, raw: bool) -> Result<FetchResponse, TransportError> {
        let start = Instant::now();
        let is_head = method == Method::HEAD;
        let client = if raw || is_head { &self.raw } else { &self.decoding };

        let response = client.request(method.clone(), url.clone()).send().await?;

        let status = response.status();
        let final_url = response.url().clone();
        let headers = response.headers().clone();

        let bytes = if is_head { Bytes::new() } else { response.bytes().await? };

        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        // reqwest reports a zero size hint for HEAD bodies, so read the header itself.
        let declared_length = headers
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok());

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            "{} {} -> {} {} in {}ms ({} bytes{})",
            method,
            url,
            final_url,
            status.as_u16(),
            fetch_ms,
            bytes.len(),
            if raw { ", raw" } else { "" }
        );

        let response =
            FetchResponse { url: url.clone(), final_url, status, content_type, declared_length, bytes, headers, fetch_ms };

        if !status.is_success() {
            return Err(TransportError::HttpStatus(Box::new(response)));
        }

        Ok(response)
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

//! pagefetch server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use anyhow::Result;
use pagefetch_client::{Dispatcher, FetchClient, FetchConfig, RenderOptions, RenderSession, Renderer};
use pagefetch_core::cache::spawn_sweeper;
use pagefetch_core::{AppConfig, PayloadCache, RenderLogDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;

    tracing::info!("Starting pagefetch server on stdio transport");

    let log = RenderLogDb::open(&config.db_path).await?;

    let cache = Arc::new(PayloadCache::new(config.payload_ttl()));
    let sweeper = spawn_sweeper(cache.clone(), config.sweep_interval());

    let fetcher = FetchClient::new(FetchConfig::from(&config))?;
    let options = RenderOptions { timeout_ms: config.render_timeout_ms, ..Default::default() };
    let session = RenderSession::new(renderer(&config), config.max_concurrent_renders, options, log.clone());

    let dispatcher = Arc::new(Dispatcher::new(fetcher, session.clone(), cache, log));
    let handler = handler::PageFetchServer::new(dispatcher);
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;

    session.close();
    sweeper.abort();
    Ok(())
}

#[cfg(feature = "render")]
fn renderer(config: &AppConfig) -> Arc<dyn Renderer> {
    use pagefetch_client::{BrowserSettings, DisabledRenderer, HeadlessRenderer};

    if !config.render_enabled {
        tracing::info!("rendering disabled by configuration");
        return Arc::new(DisabledRenderer);
    }
    Arc::new(HeadlessRenderer::new(BrowserSettings { executable: config.chrome_executable.clone() }))
}

#[cfg(not(feature = "render"))]
fn renderer(_config: &AppConfig) -> Arc<dyn Renderer> {
    tracing::info!("built without the render feature; rendered formats return the empty payload");
    Arc::new(pagefetch_client::DisabledRenderer)
}

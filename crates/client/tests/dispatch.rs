use httpmock::Method::{GET, HEAD, POST};
use httpmock::MockServer;
use pagefetch_client::{
    Dispatcher, EMPTY_PAYLOAD, FetchClient, FetchConfig, Format, RenderError, RenderOptions, RenderSession,
    RenderedDocument, Renderer, RetrievalRequest,
};
use pagefetch_core::envelope::EMPTY_LAST_LOG;
use pagefetch_core::{PayloadCache, RenderLogDb, ResponseEnvelope};
use reqwest::Method;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

/// Renderer that counts calls and embeds the call number in the player config.
#[derive(Default)]
struct CountingRenderer {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl Renderer for CountingRenderer {
    async fn render(&self, url: &Url, _opts: &RenderOptions) -> Result<RenderedDocument, RenderError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let html = format!("<html><script>\nconfig.media = {{\"render\":{n}}};\n\nconfig.other = 1;\n</script></html>");
        Ok(RenderedDocument { html, final_url: url.clone(), render_time_ms: 1 })
    }
}

#[derive(Default)]
struct FailingRenderer {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl Renderer for FailingRenderer {
    async fn render(&self, _url: &Url, _opts: &RenderOptions) -> Result<RenderedDocument, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RenderError::Timeout(30000))
    }
}

async fn dispatcher(renderer: Arc<dyn Renderer>) -> Dispatcher {
    let log = RenderLogDb::open_in_memory().await.unwrap();
    let session = RenderSession::new(renderer, 2, RenderOptions::default(), log.clone());
    let fetcher = FetchClient::new(FetchConfig::default()).unwrap();
    Dispatcher::new(fetcher, session, Arc::new(PayloadCache::default()), log)
}

async fn http_dispatcher() -> Dispatcher {
    dispatcher(Arc::new(CountingRenderer::default())).await
}

fn to_json(envelope: &ResponseEnvelope) -> Value {
    serde_json::to_value(envelope).unwrap()
}

#[tokio::test]
async fn default_get_returns_contents_envelope() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/hello");
        then.status(200).header("content-type", "text/plain").body("hello");
    });

    let url = server.url("/hello");
    let envelope = http_dispatcher()
        .await
        .retrieve(&RetrievalRequest::new(url.clone(), Format::None, Method::GET))
        .await;

    mock.assert();
    assert_eq!(
        to_json(&envelope),
        json!({
            "contents": "hello",
            "status": {
                "url": url,
                "content_type": "text/plain",
                "content_length": 5,
                "http_code": 200
            }
        })
    );
}

#[tokio::test]
async fn not_found_keeps_body_and_status() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/missing");
        then.status(404).header("content-type", "text/html").body("<h1>not here</h1>");
    });

    let envelope = http_dispatcher()
        .await
        .retrieve(&RetrievalRequest::new(server.url("/missing"), Format::None, Method::GET))
        .await;

    mock.assert();
    let value = to_json(&envelope);
    assert_eq!(value["contents"], "<h1>not here</h1>");
    assert_eq!(value["status"]["http_code"], 404);
    assert_eq!(value["status"]["content_length"], 17);
    assert_eq!(value["status"]["content_type"], "text/html");
    assert!(value["status"].get("error").is_none());
}

#[tokio::test]
async fn connection_failure_has_null_contents() {
    let envelope = http_dispatcher()
        .await
        .retrieve(&RetrievalRequest::new("http://127.0.0.1:1/", Format::None, Method::GET))
        .await;

    let value = to_json(&envelope);
    assert_eq!(value["contents"], Value::Null);
    assert!(value["status"]["error"]["code"].is_string());
    assert!(value["status"]["error"]["message"].is_string());
}

#[tokio::test]
async fn invalid_url_is_an_error_envelope() {
    let envelope = http_dispatcher()
        .await
        .retrieve(&RetrievalRequest::new("ftp://example.com/file", Format::Raw, Method::GET))
        .await;

    let value = to_json(&envelope);
    assert_eq!(value["contents"], Value::Null);
    assert_eq!(value["status"]["error"]["code"], "INVALID_URL");
}

#[tokio::test]
async fn info_format_sends_head_without_body() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(HEAD).path("/file");
        then.status(200).header("content-type", "application/octet-stream");
    });

    let envelope = http_dispatcher()
        .await
        .retrieve(&RetrievalRequest::new(server.url("/file"), Format::Info, Method::GET))
        .await;

    mock.assert();
    let value = to_json(&envelope);
    assert_eq!(value["http_code"], 200);
    assert_eq!(value["content_type"], "application/octet-stream");
    assert_eq!(value["url"], server.url("/file"));
    assert!(value["content_length"].is_i64());
    assert!(value.get("contents").is_none());
    assert!(value.get("content").is_none());
}

#[tokio::test]
async fn info_keeps_declared_length_of_compressed_resource() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(HEAD).path("/archive");
        then.status(200).header("content-encoding", "gzip").header("content-length", "1234");
    });

    let envelope = http_dispatcher()
        .await
        .retrieve(&RetrievalRequest::new(server.url("/archive"), Format::Info, Method::GET))
        .await;

    mock.assert();
    let value = to_json(&envelope);
    assert_eq!(value["content_length"], 1234);
    assert_eq!(value["http_code"], 200);
}

#[tokio::test]
async fn envelopes_echo_the_url_as_requested() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200).body("root");
    });
    server.mock(|when, then| {
        when.method(HEAD).path("/");
        then.status(200);
    });

    let requested = server.base_url();
    assert!(!requested.ends_with('/'));
    let dispatcher = http_dispatcher().await;

    let contents = dispatcher
        .retrieve(&RetrievalRequest::new(requested.clone(), Format::None, Method::GET))
        .await;
    let value = to_json(&contents);
    assert_eq!(value["contents"], "root");
    assert_eq!(value["status"]["url"], requested);

    let info = dispatcher
        .retrieve(&RetrievalRequest::new(requested.clone(), Format::Info, Method::GET))
        .await;
    assert_eq!(to_json(&info)["url"], requested);
}

#[tokio::test]
async fn head_method_is_a_probe_for_any_format() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(HEAD).path("/page");
        then.status(200);
    });

    let envelope = http_dispatcher()
        .await
        .retrieve(&RetrievalRequest::new(server.url("/page"), Format::Raw, Method::HEAD))
        .await;

    mock.assert();
    assert!(matches!(envelope, ResponseEnvelope::Info(_)));
}

#[tokio::test]
async fn info_failure_uses_contents_envelope() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(HEAD).path("/gone");
        then.status(410);
    });

    let envelope = http_dispatcher()
        .await
        .retrieve(&RetrievalRequest::new(server.url("/gone"), Format::Info, Method::GET))
        .await;

    let value = to_json(&envelope);
    assert_eq!(value["status"]["http_code"], 410);
    assert_eq!(value["contents"], "");
}

#[tokio::test]
async fn raw_keeps_encoded_bytes() {
    let server = MockServer::start();
    let body: &[u8] = &[0x1b, 0x03, 0x00, 0xf8, 0xa5, 0x40];
    let mock = server.mock(|when, then| {
        when.method(GET).path("/blob");
        then.status(200)
            .header("content-type", "text/plain")
            .header("content-encoding", "br")
            .body(body);
    });

    let envelope = http_dispatcher()
        .await
        .retrieve(&RetrievalRequest::new(server.url("/blob"), Format::Raw, Method::GET))
        .await;

    mock.assert();
    match envelope {
        ResponseEnvelope::Raw(raw) => {
            assert_eq!(raw.content.as_ref(), body);
            assert_eq!(raw.content_length, body.len());
            assert_eq!(raw.content_type.as_deref(), Some("text/plain"));
        }
        other => panic!("expected raw envelope, got {other:?}"),
    }
}

#[tokio::test]
async fn raw_serializes_with_camel_case_keys() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/abc");
        then.status(200).body("abc");
    });

    let envelope = http_dispatcher()
        .await
        .retrieve(&RetrievalRequest::new(server.url("/abc"), Format::Raw, Method::GET))
        .await;

    let value = to_json(&envelope);
    assert_eq!(value["content"], json!([97, 98, 99]));
    assert_eq!(value["contentLength"], 3);
}

#[tokio::test]
async fn request_method_is_forwarded() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/submit");
        then.status(201).body("created");
    });

    let envelope = http_dispatcher()
        .await
        .retrieve(&RetrievalRequest::new(server.url("/submit"), Format::None, Method::POST))
        .await;

    mock.assert();
    let value = to_json(&envelope);
    assert_eq!(value["contents"], "created");
    assert_eq!(value["status"]["http_code"], 201);
}

#[tokio::test]
async fn unknown_format_falls_back_to_contents() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200).body("index");
    });

    let request = RetrievalRequest::new(server.url("/"), Format::from("markdown"), Method::GET);
    let value = to_json(&http_dispatcher().await.retrieve(&request).await);
    assert_eq!(value["contents"], "index");
}

#[tokio::test]
async fn lastlog_without_prior_render() {
    let envelope = http_dispatcher()
        .await
        .retrieve(&RetrievalRequest::new("", Format::LastLog, Method::GET))
        .await;

    assert_eq!(envelope, ResponseEnvelope::Payload(EMPTY_LAST_LOG.to_string()));
}

#[tokio::test]
async fn vilos_renders_once_then_serves_cache() {
    let renderer = Arc::new(CountingRenderer::default());
    let dispatcher = dispatcher(renderer.clone()).await;
    let request = RetrievalRequest::new("https://player.example.com/watch/1", Format::Vilos, Method::GET);

    let first = dispatcher.retrieve(&request).await;
    let second = dispatcher.retrieve(&request).await;

    assert_eq!(first, ResponseEnvelope::Payload("{\"render\":1}".to_string()));
    assert_eq!(second, first);
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn viloslog_rerenders_updates_cache_and_persists() {
    let renderer = Arc::new(CountingRenderer::default());
    let dispatcher = dispatcher(renderer.clone()).await;
    let url = "https://player.example.com/watch/2";

    let cached = dispatcher.retrieve(&RetrievalRequest::new(url, Format::Vilos, Method::GET)).await;
    assert_eq!(cached.as_payload(), Some("{\"render\":1}"));

    let logged = dispatcher.retrieve(&RetrievalRequest::new(url, Format::VilosLog, Method::GET)).await;
    assert_eq!(logged.as_payload(), Some("{\"render\":2}"));
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 2);

    let refreshed = dispatcher.retrieve(&RetrievalRequest::new(url, Format::Vilos, Method::GET)).await;
    assert_eq!(refreshed.as_payload(), Some("{\"render\":2}"));
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 2);

    let last = dispatcher.retrieve(&RetrievalRequest::new("", Format::LastLog, Method::GET)).await;
    let document = last.as_payload().unwrap();
    assert!(document.starts_with("<html>"));
    assert!(document.contains("config.media = {\"render\":2};"));
}

#[tokio::test]
async fn failed_render_returns_sentinel_and_is_not_cached() {
    let renderer = Arc::new(FailingRenderer::default());
    let dispatcher = dispatcher(renderer.clone()).await;
    let request = RetrievalRequest::new("https://player.example.com/watch/3", Format::Vilos, Method::GET);

    assert_eq!(dispatcher.retrieve(&request).await.as_payload(), Some(EMPTY_PAYLOAD));
    assert_eq!(dispatcher.retrieve(&request).await.as_payload(), Some(EMPTY_PAYLOAD));
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 2);

    let last = dispatcher.retrieve(&RetrievalRequest::new("", Format::LastLog, Method::GET)).await;
    assert_eq!(last.as_payload(), Some(EMPTY_LAST_LOG));
}

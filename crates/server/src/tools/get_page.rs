//! get_page tool implementation.
//!
//! Thin adapter from MCP parameters to a [`RetrievalRequest`]. All retrieval
//! failures, an empty or unparsable URL included, come back inside the
//! envelope; only an unparsable method is reported as a tool error.

use pagefetch_client::{Dispatcher, Format, Method, RetrievalRequest};
use pagefetch_core::{Error, ResponseEnvelope};
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input parameters for get_page tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetPageParams {
    /// The URL to retrieve. Not needed for "lastlog".
    #[serde(default)]
    pub url: String,

    /// Response shape:
    /// - "info": status and headers only (HEAD)
    /// - "raw": undecoded body bytes
    /// - "vilos": embedded player configuration from the rendered page (cached)
    /// - "viloslog": like "vilos", but always re-renders and records the page
    /// - "lastlog": the last recorded rendered page
    ///
    /// Anything else returns the decoded contents with status.
    #[serde(default)]
    pub format: Option<String>,

    /// HTTP method (default: GET).
    #[serde(default)]
    pub method: Option<String>,
}

impl GetPageParams {
    fn into_request(self) -> Result<RetrievalRequest, Error> {
        let format = self.format.as_deref().map(Format::from).unwrap_or_default();

        let method = match self.method.as_deref().map(str::trim) {
            None | Some("") => Method::GET,
            Some(m) => Method::from_bytes(m.to_ascii_uppercase().as_bytes())
                .map_err(|_| Error::InvalidInput(format!("unsupported method: {}", m)))?,
        };

        Ok(RetrievalRequest::new(self.url, format, method))
    }
}

/// Implementation of the get_page tool.
pub async fn get_page_impl(dispatcher: &Dispatcher, params: GetPageParams) -> Result<CallToolResult, McpError> {
    let request = params.into_request()?;
    let envelope = dispatcher.retrieve(&request).await;

    let text = match envelope {
        ResponseEnvelope::Payload(payload) => payload,
        other => serde_json::to_string_pretty(&other)
            .map_err(|e| McpError::internal_error(format!("failed to serialize envelope: {e}"), None))?,
    };

    Ok(CallToolResult::success(vec![Content::text(text)]))
}

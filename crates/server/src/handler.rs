//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use crate::tools::get_page::{GetPageParams, get_page_impl};

use pagefetch_client::Dispatcher;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use std::sync::Arc;

/// The main MCP server handler for pagefetch.
#[derive(Clone)]
pub struct PageFetchServer {
    tool_router: ToolRouter<Self>,
    dispatcher: Arc<Dispatcher>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl PageFetchServer {
    /// Create a new server handler around a shared dispatcher.
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { tool_router: Self::tool_router(), dispatcher }
    }

    /// Retrieve a page in the requested shape.
    ///
    /// Network and render failures are reported inside the returned envelope.
    #[tool(
        description = "Retrieve a URL. format selects the result: info (HEAD metadata), raw (undecoded bytes), \
                       vilos (embedded player config from the rendered page, cached), viloslog (re-render and record), \
                       lastlog (last recorded page); default is decoded contents with status."
    )]
    async fn get_page(&self, params: Parameters<GetPageParams>) -> Result<CallToolResult, McpError> {
        get_page_impl(&self.dispatcher, params.0).await
    }
}

impl ServerHandler for PageFetchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "pagefetch".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.

use std::sync::Arc;

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

use conan_mcp_client::{
    ConanCenterClient, GitHubClient, GitHubConfig, ReadmeSource, RecipeSource, RegistryConfig,
};
use conan_mcp_core::{AppConfig, MemoryCache};

use crate::tools::cache::stats_impl;
use crate::tools::get_package_info::{GetPackageInfoParams, info_impl};
use crate::tools::get_package_readme::{GetPackageReadmeParams, readme_impl};
use crate::tools::search_packages::{SearchPackagesParams, search_impl};

/// Explicitly constructed application state, injected into the handler.
///
/// The cache's lifecycle is owned here: created with the state, torn down by
/// the caller via `cache.destroy()` on shutdown.
pub struct AppState {
    pub config: AppConfig,
    pub cache: MemoryCache,
    pub registry: Arc<dyn RecipeSource>,
    pub github: Arc<dyn ReadmeSource>,
}

impl AppState {
    /// Build production state from configuration.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let cache = MemoryCache::new(config.cache_options());
        let registry = ConanCenterClient::new(RegistryConfig {
            base_url: config.registry_base_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
            token: config.github_token.clone(),
        })?;
        let github = GitHubClient::new(GitHubConfig {
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
            token: config.github_token.clone(),
            ..Default::default()
        })?;

        Ok(Self { config, cache, registry: Arc::new(registry), github: Arc::new(github) })
    }

    /// Build state around caller-supplied sources.
    #[cfg(test)]
    pub fn with_sources(
        config: AppConfig,
        registry: Arc<dyn RecipeSource>,
        github: Arc<dyn ReadmeSource>,
    ) -> Self {
        let cache = MemoryCache::new(config.cache_options());
        Self { config, cache, registry, github }
    }
}

/// The main MCP server handler for mcp-conan.
#[derive(Clone)]
pub struct ConanMcpServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl ConanMcpServer {
    /// Create a new server handler around the shared state.
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state, tool_router: Self::tool_router() }
    }

    /// Look up a package's resolved metadata.
    #[tool(
        description = "Get Conan package metadata: latest version, license, topics, and optionally dependencies and options. Returns exists=false for unknown packages."
    )]
    async fn get_package_info(
        &self,
        params: Parameters<GetPackageInfoParams>,
    ) -> Result<CallToolResult, McpError> {
        info_impl(&self.state, params.0).await
    }

    /// Fetch a package's README with usage examples and install snippets.
    #[tool(
        description = "Get a Conan package README with usage examples and conan/cmake installation snippets. Returns exists=false for unknown packages."
    )]
    async fn get_package_readme(
        &self,
        params: Parameters<GetPackageReadmeParams>,
    ) -> Result<CallToolResult, McpError> {
        readme_impl(&self.state, params.0).await
    }

    /// Search the recipe index by name.
    #[tool(description = "Search Conan packages by name. Returns up to `limit` matches (default 20).")]
    async fn search_packages(
        &self,
        params: Parameters<SearchPackagesParams>,
    ) -> Result<CallToolResult, McpError> {
        search_impl(&self.state, params.0).await
    }

    /// Report cache occupancy and configuration.
    #[tool(description = "Report the in-process cache's entry count, estimated memory usage, and configured limits.")]
    async fn cache_stats(&self) -> Result<CallToolResult, McpError> {
        stats_impl(&self.state).await
    }
}

impl ServerHandler for ConanMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "mcp-conan".into(),
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

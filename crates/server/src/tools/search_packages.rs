//! search_packages tool implementation.
//!
//! Name search over the recipe index, cached under a base64-encoded query
//! key so arbitrary query text cannot collide with the key format.

use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use conan_mcp_core::cache::key;

use crate::handler::AppState;
use crate::tools::{SEARCH_RESULTS_TTL, registry_failure, validate};

/// Input parameters for search_packages tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SearchPackagesParams {
    /// Search query (required, 1-200 characters).
    pub query: String,

    /// Maximum number of results (1-100, default 20).
    #[serde(default)]
    pub limit: Option<u32>,
}

/// One package match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PackageSearchResult {
    pub name: String,
    pub version: String,
    pub description: String,
    pub topics: Vec<String>,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    pub license: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Output structure for search_packages tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchPackagesOutput {
    /// The query after trimming.
    pub query: String,
    pub total: usize,
    pub packages: Vec<PackageSearchResult>,
}

/// Implementation of the search_packages tool.
pub async fn search_impl(state: &AppState, params: SearchPackagesParams) -> Result<CallToolResult, McpError> {
    let query = validate::search_query(&params.query)?;
    let limit = validate::limit(params.limit)?;

    let cache_key = key::search_results(&query, limit as u32);
    if let Some(cached) = state.cache.get::<SearchPackagesOutput>(&cache_key) {
        tracing::debug!(query = %query, "returning cached search results");
        return Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&cached).unwrap_or_default(),
        )]));
    }

    let found = state
        .registry
        .search(&query, limit)
        .await
        .map_err(registry_failure)?;

    let packages: Vec<PackageSearchResult> = found
        .results
        .into_iter()
        .map(|pkg| PackageSearchResult {
            name: pkg.name,
            version: pkg.latest_version,
            description: pkg.description,
            topics: pkg.topics,
            author: pkg.author,
            homepage: pkg.homepage,
            license: pkg.license,
            created_at: pkg.created_at,
            updated_at: pkg.updated_at,
        })
        .collect();

    let output = SearchPackagesOutput { query, total: found.total_count, packages };

    state.cache.set(&cache_key, output.clone(), Some(SEARCH_RESULTS_TTL));
    tracing::info!(query = %output.query, total = output.total, "search complete");

    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(&output).unwrap_or_default(),
    )]))
}

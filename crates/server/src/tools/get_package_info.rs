//! get_package_info tool implementation.
//!
//! Resolves a package's recipe metadata through the cache, fetching from the
//! recipe index only on a miss. An unknown package is a successful
//! `exists: false` response, cached briefly.

use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use conan_mcp_client::RegistryError;
use conan_mcp_core::cache::key;

use crate::handler::AppState;
use crate::tools::{
    NEGATIVE_RESULT_TTL, PACKAGE_INFO_TTL, RepositoryInfo, registry_failure,
    repository_from_homepage, validate,
};

/// Input parameters for get_package_info tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetPackageInfoParams {
    /// Package name in the recipe index (required).
    pub package_name: String,

    /// Include the dependency list (default true).
    #[serde(default)]
    pub include_dependencies: Option<bool>,

    /// Include package options (default false).
    #[serde(default)]
    pub include_options: Option<bool>,
}

/// Output structure for get_package_info tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PackageInfoOutput {
    pub package_name: String,
    pub latest_version: String,
    pub description: String,
    pub author: String,
    pub license: String,
    pub topics: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<RepositoryInfo>,
    /// False when the recipe index has no such package.
    pub exists: bool,
}

impl PackageInfoOutput {
    fn missing(package_name: &str) -> Self {
        Self {
            package_name: package_name.to_string(),
            latest_version: String::new(),
            description: String::new(),
            author: String::new(),
            license: String::new(),
            topics: Vec::new(),
            dependencies: None,
            options: None,
            repository: None,
            exists: false,
        }
    }
}

/// Implementation of the get_package_info tool.
pub async fn info_impl(state: &AppState, params: GetPackageInfoParams) -> Result<CallToolResult, McpError> {
    let package_name = validate::package_name(&params.package_name)?;
    let include_dependencies = params.include_dependencies.unwrap_or(true);
    let include_options = params.include_options.unwrap_or(false);

    let cache_key = key::package_info(&package_name, "latest");
    if let Some(cached) = state.cache.get::<PackageInfoOutput>(&cache_key) {
        tracing::debug!(package = %package_name, "returning cached package info");
        return Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&cached).unwrap_or_default(),
        )]));
    }

    let info = match state.registry.recipe_info(&package_name).await {
        Ok(info) => info,
        Err(RegistryError::PackageNotFound(_)) => {
            tracing::debug!(package = %package_name, "package not found");
            let output = PackageInfoOutput::missing(&package_name);
            state.cache.set(&cache_key, output.clone(), Some(NEGATIVE_RESULT_TTL));
            return Ok(CallToolResult::success(vec![Content::text(
                serde_json::to_string_pretty(&output).unwrap_or_default(),
            )]));
        }
        Err(err) => return Err(registry_failure(err).into()),
    };

    let mut dependencies = None;
    let mut options = None;
    if include_dependencies || include_options {
        match state.registry.recipe_details(&package_name, &info.latest_version).await {
            Ok(Some(details)) => {
                if include_dependencies {
                    dependencies = details.requires;
                }
                if include_options {
                    options = details.options;
                }
            }
            Ok(None) => {}
            Err(err) => {
                // Details are an enrichment; the lookup still succeeds.
                tracing::debug!(package = %package_name, %err, "recipe details unavailable");
            }
        }
    }

    let output = PackageInfoOutput {
        package_name: info.name,
        latest_version: info.latest_version,
        description: info.description,
        author: info.author,
        license: info.license,
        topics: info.topics,
        dependencies,
        options,
        repository: repository_from_homepage(info.homepage.as_deref()),
        exists: true,
    };

    state.cache.set(&cache_key, output.clone(), Some(PACKAGE_INFO_TTL));
    tracing::info!(package = %output.package_name, "retrieved package info");

    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(&output).unwrap_or_default(),
    )]))
}

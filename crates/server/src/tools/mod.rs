//! MCP tool implementations.
//!
//! This module contains all tools exposed by the mcp-conan server, plus the
//! response-shaping pieces they share: cache TTLs, the repository pointer,
//! and the mapping from client failures into the unified error space.

pub mod cache;
pub mod get_package_info;
pub mod get_package_readme;
pub mod search_packages;
pub mod validate;

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use conan_mcp_client::RegistryError;
use conan_mcp_core::Error;

/// TTL for positive package-info responses.
pub(crate) const PACKAGE_INFO_TTL: Duration = Duration::from_secs(30 * 60);

/// TTL for positive README responses.
pub(crate) const PACKAGE_README_TTL: Duration = Duration::from_secs(60 * 60);

/// TTL for search results.
pub(crate) const SEARCH_RESULTS_TTL: Duration = Duration::from_secs(15 * 60);

/// TTL for `exists: false` responses. Must stay well below the positive
/// TTLs.
pub(crate) const NEGATIVE_RESULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Repository pointer included in package responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RepositoryInfo {
    /// Repository kind, currently always "git".
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

/// Repository pointer derived from a recipe's homepage, when it has one.
pub(crate) fn repository_from_homepage(homepage: Option<&str>) -> Option<RepositoryInfo> {
    homepage
        .filter(|url| !url.is_empty())
        .map(|url| RepositoryInfo { kind: "git".to_string(), url: url.to_string() })
}

/// Map a registry failure into the unified error space.
///
/// Package-level not-found never reaches this point on the happy path; the
/// tools turn it into an `exists: false` response first.
pub(crate) fn registry_failure(err: RegistryError) -> Error {
    match err {
        RegistryError::PackageNotFound(_) => Error::Upstream { status: 404 },
        RegistryError::RateLimited { retry_after } => Error::RateLimited { retry_after },
        RegistryError::ServiceUnavailable { status } => Error::ServiceUnavailable { status },
        RegistryError::Http { status } => Error::Upstream { status },
        RegistryError::Timeout => Error::Timeout("upstream request timed out".to_string()),
        RegistryError::Network(err) => Error::NetworkFailure(err.to_string()),
        RegistryError::Parse(msg) => Error::Unknown(msg),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Canned collaborators for exercising the tools without a network.

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use conan_mcp_client::{
        PackageSummary, ReadmeSource, RecipeDetails, RecipeInfo, RecipeSource, RegistryError,
        SearchResults,
    };
    use conan_mcp_core::AppConfig;

    use crate::handler::AppState;

    pub(crate) fn recipe(name: &str, versions: &[&str], homepage: Option<&str>) -> RecipeInfo {
        RecipeInfo {
            name: name.to_string(),
            latest_version: versions.last().map(|v| v.to_string()).unwrap_or_else(|| "unknown".into()),
            versions: versions.iter().map(|v| v.to_string()).collect(),
            description: format!("Conan package for {name}"),
            license: "Unknown".to_string(),
            author: "Conan Center".to_string(),
            homepage: homepage.map(str::to_string),
            topics: Vec::new(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    pub(crate) fn summary(name: &str) -> PackageSummary {
        PackageSummary {
            name: name.to_string(),
            description: format!("Conan package for {name}"),
            topics: Vec::new(),
            license: "Unknown".to_string(),
            author: "Conan Center".to_string(),
            homepage: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
            latest_version: "unknown".to_string(),
        }
    }

    /// Recipe source with canned responses and a call counter.
    #[derive(Default)]
    pub(crate) struct FakeRegistry {
        pub recipe: Option<RecipeInfo>,
        pub matches: Vec<PackageSummary>,
        pub requires: Option<Vec<String>>,
        pub options: Option<serde_json::Value>,
        pub calls: AtomicUsize,
    }

    impl FakeRegistry {
        pub(crate) fn with_recipe(recipe: RecipeInfo) -> Arc<Self> {
            Arc::new(Self { recipe: Some(recipe), ..Default::default() })
        }

        pub(crate) fn not_found() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub(crate) fn with_matches(matches: Vec<PackageSummary>) -> Arc<Self> {
            Arc::new(Self { matches, ..Default::default() })
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RecipeSource for FakeRegistry {
        async fn search(&self, _query: &str, limit: usize) -> Result<SearchResults, RegistryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let results: Vec<PackageSummary> = self.matches.iter().take(limit).cloned().collect();
            Ok(SearchResults { total_count: results.len(), results })
        }

        async fn recipe_info(&self, package_name: &str) -> Result<RecipeInfo, RegistryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.recipe
                .clone()
                .ok_or_else(|| RegistryError::PackageNotFound(package_name.to_string()))
        }

        async fn recipe_details(
            &self,
            package_name: &str,
            version: &str,
        ) -> Result<Option<RecipeDetails>, RegistryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let Some(recipe) = self.recipe.clone() else {
                return Err(RegistryError::PackageNotFound(package_name.to_string()));
            };
            if !recipe.has_version(version) {
                return Ok(None);
            }
            Ok(Some(RecipeDetails {
                name: recipe.name,
                version: version.to_string(),
                description: recipe.description,
                license: recipe.license,
                author: recipe.author,
                homepage: recipe.homepage,
                topics: recipe.topics,
                requires: self.requires.clone(),
                options: self.options.clone(),
            }))
        }
    }

    /// Recipe source where every call fails like a flaky upstream.
    pub(crate) struct FailingRegistry;

    #[async_trait]
    impl RecipeSource for FailingRegistry {
        async fn search(&self, _query: &str, _limit: usize) -> Result<SearchResults, RegistryError> {
            Err(RegistryError::ServiceUnavailable { status: 503 })
        }

        async fn recipe_info(&self, _package_name: &str) -> Result<RecipeInfo, RegistryError> {
            Err(RegistryError::ServiceUnavailable { status: 503 })
        }

        async fn recipe_details(
            &self,
            _package_name: &str,
            _version: &str,
        ) -> Result<Option<RecipeDetails>, RegistryError> {
            Err(RegistryError::ServiceUnavailable { status: 503 })
        }
    }

    /// README source with a canned body and a call counter.
    #[derive(Default)]
    pub(crate) struct FakeGithub {
        pub readme: Option<String>,
        pub calls: AtomicUsize,
    }

    impl FakeGithub {
        pub(crate) fn with_readme(readme: &str) -> Arc<Self> {
            Arc::new(Self { readme: Some(readme.to_string()), calls: AtomicUsize::new(0) })
        }

        pub(crate) fn absent() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReadmeSource for FakeGithub {
        async fn readme_content(&self, _repository_url: &str) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.readme.clone()
        }
    }

    pub(crate) fn state_with(
        registry: Arc<dyn RecipeSource>,
        github: Arc<dyn ReadmeSource>,
    ) -> AppState {
        AppState::with_sources(AppConfig::default(), registry, github)
    }

    /// Pull the JSON text out of a tool result and parse it.
    pub(crate) fn parse_output<T: serde::de::DeserializeOwned>(
        result: &rmcp::model::CallToolResult,
    ) -> T {
        let content_val = serde_json::to_value(&result.content[0]).expect("content serializes");
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("expected text content");
        serde_json::from_str(text).expect("output parses")
    }
}

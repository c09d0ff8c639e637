//! Conan Center recipe-index client.
//!
//! Reads the conan-center-index recipe tree through the GitHub contents API
//! with rate limiting, typed status classification, and retry/backoff.
//!
//! ### Specification
//!
//! - **Endpoint**: `https://api.github.com/repos/conan-io/conan-center-index/contents/...`
//! - **Authentication**: optional bearer token; unauthenticated calls work
//!   under tighter upstream quotas.
//! - **Classification**: every non-success status becomes a discrete
//!   [`RegistryError`] variant at the response site.
//! - **Retry**: transient failures (429, 5xx, timeout, transport) retried
//!   with exponential backoff, honouring Retry-After.

pub mod error;
pub mod response;
pub mod retry;

pub use error::RegistryError;
pub use response::{ContentsEntry, PackageSummary, RecipeDetails, RecipeInfo, SearchResults};
pub use retry::with_retry;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use response::{is_version_folder, latest_version, placeholder_summary};

/// Default base URL for the recipe index contents API.
const DEFAULT_BASE_URL: &str = "https://api.github.com/repos/conan-io/conan-center-index";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "conan-mcp/0.1";

/// Minimum interval between outbound requests.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(500);

/// Source of recipe metadata, as consumed by the request handlers.
///
/// The production implementation is [`ConanCenterClient`]; tests substitute
/// canned responses behind the same seam.
#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// List packages whose name contains `query`, up to `limit`.
    async fn search(&self, query: &str, limit: usize) -> Result<SearchResults, RegistryError>;

    /// Resolve a package's recipe metadata, failing with
    /// [`RegistryError::PackageNotFound`] when the recipe folder is absent.
    async fn recipe_info(&self, package_name: &str) -> Result<RecipeInfo, RegistryError>;

    /// Recipe metadata narrowed to one version; `None` when the version
    /// folder is absent.
    async fn recipe_details(
        &self,
        package_name: &str,
        version: &str,
    ) -> Result<Option<RecipeDetails>, RegistryError>;
}

/// Registry client configuration.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Contents-API base URL (default: conan-center-index on api.github.com).
    pub base_url: String,
    /// Request timeout (default: 10s).
    pub timeout: Duration,
    /// User-agent string (default: conan-mcp/0.x).
    pub user_agent: String,
    /// Optional bearer token for authenticated requests.
    pub token: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            token: None,
        }
    }
}

/// Rate limiter to enforce request intervals.
#[derive(Debug)]
struct RateLimiter {
    last_request: Mutex<Instant>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(Instant::now().checked_sub(min_interval).unwrap_or_else(Instant::now)),
            min_interval,
        }
    }

    /// Acquire permission to make a request, waiting if necessary.
    async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();
        if elapsed < self.min_interval {
            tokio::time::sleep(self.min_interval - elapsed).await;
        }
        *last = Instant::now();
    }
}

/// Conan Center recipe-index client.
#[derive(Debug, Clone)]
pub struct ConanCenterClient {
    http: reqwest::Client,
    config: RegistryConfig,
    rate_limiter: Arc<RateLimiter>,
}

impl ConanCenterClient {
    /// Create a new registry client with the given configuration.
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RegistryError::Network(Arc::new(e)))?;

        Ok(Self { http, config, rate_limiter: Arc::new(RateLimiter::new(MIN_REQUEST_INTERVAL)) })
    }

    /// List packages whose folder name contains `query`, case-insensitively.
    pub async fn search_packages(&self, query: &str, limit: usize) -> Result<SearchResults, RegistryError> {
        tracing::debug!(query, limit, "searching recipe index");
        let listing = self.contents("recipes", None).await?;
        let results = filter_matching(&listing, query, limit);
        tracing::debug!(count = results.len(), query, "search complete");
        Ok(SearchResults { total_count: results.len(), results })
    }

    /// Resolve recipe metadata for one package from its folder listing.
    pub async fn get_recipe_info(&self, package_name: &str) -> Result<RecipeInfo, RegistryError> {
        tracing::debug!(package = package_name, "fetching recipe info");
        let listing = self
            .contents(&format!("recipes/{package_name}"), Some(package_name))
            .await?;

        let versions: Vec<String> = listing
            .into_iter()
            .filter(ContentsEntry::is_dir)
            .map(|entry| entry.name)
            .filter(|name| is_version_folder(name))
            .collect();
        let latest = latest_version(&versions).unwrap_or("unknown").to_string();

        let now = Utc::now().to_rfc3339();
        Ok(RecipeInfo {
            name: package_name.to_string(),
            latest_version: latest,
            versions,
            description: format!("Conan package for {package_name}"),
            license: "Unknown".to_string(),
            author: "Conan Center".to_string(),
            homepage: None,
            topics: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Recipe metadata narrowed to one version, or `None` if the version
    /// folder is absent.
    pub async fn get_recipe_details(
        &self,
        package_name: &str,
        version: &str,
    ) -> Result<Option<RecipeDetails>, RegistryError> {
        let info = self.get_recipe_info(package_name).await?;
        if !info.has_version(version) {
            return Ok(None);
        }

        Ok(Some(RecipeDetails {
            name: info.name,
            version: version.to_string(),
            description: info.description,
            license: info.license,
            author: info.author,
            homepage: info.homepage,
            topics: info.topics,
            requires: None,
            options: None,
        }))
    }

    /// The newest version folder of a recipe.
    pub async fn get_latest_version(&self, package_name: &str) -> Result<String, RegistryError> {
        Ok(self.get_recipe_info(package_name).await?.latest_version)
    }

    /// All version folders of a recipe, sorted lexicographically.
    pub async fn get_available_versions(&self, package_name: &str) -> Result<Vec<String>, RegistryError> {
        let mut versions = self.get_recipe_info(package_name).await?.versions;
        versions.sort();
        Ok(versions)
    }

    async fn contents(
        &self,
        path: &str,
        missing_package: Option<&str>,
    ) -> Result<Vec<ContentsEntry>, RegistryError> {
        self.rate_limiter.acquire().await;
        with_retry(path, || self.contents_once(path, missing_package)).await
    }

    async fn contents_once(
        &self,
        path: &str,
        missing_package: Option<&str>,
    ) -> Result<Vec<ContentsEntry>, RegistryError> {
        let url = format!("{}/contents/{}", self.config.base_url, path);

        let mut request = self
            .http
            .get(&url)
            .header(header::ACCEPT, "application/vnd.github.v3+json")
            .header(header::USER_AGENT, &self.config.user_agent);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(RegistryError::from)?;
        let status = response.status();
        tracing::debug!(%url, status = status.as_u16(), "contents response");

        if status.as_u16() == 404 {
            return Err(match missing_package {
                Some(name) => RegistryError::PackageNotFound(name.to_string()),
                None => RegistryError::Http { status: 404 },
            });
        }
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse().ok());
            return Err(RegistryError::RateLimited { retry_after });
        }
        if status.is_server_error() {
            return Err(RegistryError::ServiceUnavailable { status: status.as_u16() });
        }
        if !status.is_success() {
            return Err(RegistryError::Http { status: status.as_u16() });
        }

        let bytes = response.bytes().await.map_err(RegistryError::from)?;
        serde_json::from_slice(&bytes).map_err(|e| RegistryError::Parse(e.to_string()))
    }
}

#[async_trait]
impl RecipeSource for ConanCenterClient {
    async fn search(&self, query: &str, limit: usize) -> Result<SearchResults, RegistryError> {
        self.search_packages(query, limit).await
    }

    async fn recipe_info(&self, package_name: &str) -> Result<RecipeInfo, RegistryError> {
        self.get_recipe_info(package_name).await
    }

    async fn recipe_details(
        &self,
        package_name: &str,
        version: &str,
    ) -> Result<Option<RecipeDetails>, RegistryError> {
        self.get_recipe_details(package_name, version).await
    }
}

/// Directory entries matching `query`, truncated to `limit`.
fn filter_matching(listing: &[ContentsEntry], query: &str, limit: usize) -> Vec<PackageSummary> {
    let needle = query.to_lowercase();
    listing
        .iter()
        .filter(|entry| entry.is_dir() && entry.name.to_lowercase().contains(&needle))
        .take(limit)
        .map(|entry| placeholder_summary(&entry.name))
        .collect()
}

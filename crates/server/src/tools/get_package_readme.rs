//! get_package_readme tool implementation.
//!
//! Resolves a package's README through the cache, fetching the recipe and
//! the repository README only on a miss. Packages without a reachable
//! README get a generated fallback so the response always carries usable
//! installation snippets.

use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use conan_mcp_client::RegistryError;
use conan_mcp_client::readme;
use conan_mcp_core::cache::key;
use conan_mcp_core::error::Error;

use crate::handler::AppState;
use crate::tools::{
    NEGATIVE_RESULT_TTL, PACKAGE_README_TTL, RepositoryInfo, registry_failure,
    repository_from_homepage, validate,
};

/// Input parameters for get_package_readme tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetPackageReadmeParams {
    /// Package name in the recipe index (required).
    pub package_name: String,

    /// Version to resolve (default "latest").
    #[serde(default)]
    pub version: Option<String>,

    /// Extract usage examples from the README (default true).
    #[serde(default)]
    pub include_examples: Option<bool>,
}

/// One usage example lifted from the README.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UsageExample {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub code: String,
    pub language: String,
}

impl From<readme::UsageExample> for UsageExample {
    fn from(example: readme::UsageExample) -> Self {
        Self {
            title: example.title,
            description: example.description,
            code: example.code,
            language: example.language,
        }
    }
}

/// Installation snippets for the package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InstallationInfo {
    /// `conan install` command line.
    pub conan: String,
    /// CMake find_package invocation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmake: Option<String>,
    /// pkg-config invocation, when applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pkgconfig: Option<String>,
}

/// Identity block for the resolved package version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PackageBasicInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    pub license: String,
    pub author: String,
    pub topics: Vec<String>,
}

/// Output structure for get_package_readme tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PackageReadmeOutput {
    pub package_name: String,
    /// Resolved version ("latest" is replaced by the actual newest version).
    pub version: String,
    pub description: String,
    pub readme_content: String,
    pub usage_examples: Vec<UsageExample>,
    pub installation: InstallationInfo,
    pub basic_info: PackageBasicInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<RepositoryInfo>,
    /// False when the recipe index has no such package.
    pub exists: bool,
}

impl PackageReadmeOutput {
    fn missing(package_name: &str, version: &str) -> Self {
        Self {
            package_name: package_name.to_string(),
            version: version.to_string(),
            description: String::new(),
            readme_content: String::new(),
            usage_examples: Vec::new(),
            installation: installation_for(package_name, version),
            basic_info: PackageBasicInfo {
                name: package_name.to_string(),
                version: version.to_string(),
                description: String::new(),
                homepage: None,
                license: String::new(),
                author: String::new(),
                topics: Vec::new(),
            },
            repository: None,
            exists: false,
        }
    }
}

/// Implementation of the get_package_readme tool.
pub async fn readme_impl(
    state: &AppState,
    params: GetPackageReadmeParams,
) -> Result<CallToolResult, McpError> {
    let package_name = validate::package_name(&params.package_name)?;
    let version = validate::version(params.version.as_deref())?.unwrap_or_else(|| "latest".to_string());
    let include_examples = params.include_examples.unwrap_or(true);

    let cache_key = key::package_readme(&package_name, &version);
    if let Some(cached) = state.cache.get::<PackageReadmeOutput>(&cache_key) {
        tracing::debug!(package = %package_name, version = %version, "returning cached README");
        return Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&cached).unwrap_or_default(),
        )]));
    }

    let info = match state.registry.recipe_info(&package_name).await {
        Ok(info) => info,
        Err(RegistryError::PackageNotFound(_)) => {
            tracing::debug!(package = %package_name, "package not found");
            let output = PackageReadmeOutput::missing(&package_name, &version);
            state.cache.set(&cache_key, output.clone(), Some(NEGATIVE_RESULT_TTL));
            return Ok(CallToolResult::success(vec![Content::text(
                serde_json::to_string_pretty(&output).unwrap_or_default(),
            )]));
        }
        Err(err) => return Err(registry_failure(err).into()),
    };

    let actual_version = if version == "latest" {
        info.latest_version.clone()
    } else if info.has_version(&version) {
        version.clone()
    } else {
        return Err(Error::VersionNotFound { package: package_name, version }.into());
    };

    let mut readme_content = String::new();
    if let Some(homepage) = info.homepage.as_deref().filter(|url| !url.is_empty()) {
        readme_content = state.github.readme_content(homepage).await.unwrap_or_default();
    }
    if readme_content.is_empty() {
        readme_content = basic_readme(&package_name, &actual_version, &info.description);
    }

    let usage_examples = if include_examples {
        readme::parse_usage_examples(&readme_content)
            .into_iter()
            .map(UsageExample::from)
            .collect()
    } else {
        Vec::new()
    };

    let output = PackageReadmeOutput {
        package_name: package_name.clone(),
        version: actual_version.clone(),
        description: info.description.clone(),
        readme_content,
        usage_examples,
        installation: installation_for(&package_name, &actual_version),
        basic_info: PackageBasicInfo {
            name: package_name.clone(),
            version: actual_version,
            description: info.description,
            homepage: info.homepage.clone(),
            license: info.license,
            author: info.author,
            topics: info.topics,
        },
        repository: repository_from_homepage(info.homepage.as_deref()),
        exists: true,
    };

    state.cache.set(&cache_key, output.clone(), Some(PACKAGE_README_TTL));
    tracing::info!(package = %output.package_name, version = %output.version, "retrieved README");

    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(&output).unwrap_or_default(),
    )]))
}

fn installation_for(package_name: &str, version: &str) -> InstallationInfo {
    InstallationInfo {
        conan: format!("conan install --requires={package_name}/{version}@"),
        cmake: Some(format!("find_package({package_name} REQUIRED)")),
        pkgconfig: None,
    }
}

/// Generated fallback README for packages without a reachable one.
fn basic_readme(package_name: &str, version: &str, description: &str) -> String {
    format!(
        "# {package_name}

{description}

## Installation

Add the following to your conanfile.txt:

```
[requires]
{package_name}/{version}@
```

Or use the command line:

```bash
conan install --requires={package_name}/{version}@
```

## CMake Integration

```cmake
find_package({package_name} REQUIRED)
target_link_libraries(your_target {package_name}::{package_name})
```

## Usage

Refer to the package documentation for detailed usage instructions.
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{FakeGithub, FakeRegistry, parse_output, recipe, state_with};

    const HOMEPAGE: &str = "https://github.com/madler/zlib";

    const README: &str = "# zlib\n\nA massively spiffy compression library.\n\n## Install\n\n```bash\nconan install --requires=zlib/1.3@\n```\n";

    fn params(name: &str, version: Option<&str>) -> GetPackageReadmeParams {
        GetPackageReadmeParams {
            package_name: name.into(),
            version: version.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_readme_fetched_from_repository() {
        let registry = FakeRegistry::with_recipe(recipe("zlib", &["1.2.13", "1.3"], Some(HOMEPAGE)));
        let github = FakeGithub::with_readme(README);
        let state = state_with(registry, github.clone());

        let result = readme_impl(&state, params("zlib", None)).await.unwrap();
        let output: PackageReadmeOutput = parse_output(&result);

        assert!(output.exists);
        assert_eq!(output.version, "1.3");
        assert_eq!(output.readme_content, README);
        assert_eq!(github.call_count(), 1);
        assert_eq!(output.installation.conan, "conan install --requires=zlib/1.3@");
        assert_eq!(output.installation.cmake.as_deref(), Some("find_package(zlib REQUIRED)"));
        assert_eq!(output.basic_info.homepage.as_deref(), Some(HOMEPAGE));
        assert_eq!(output.repository.as_ref().map(|r| r.url.as_str()), Some(HOMEPAGE));
    }

    #[tokio::test]
    async fn test_examples_extracted_from_readme() {
        let registry = FakeRegistry::with_recipe(recipe("zlib", &["1.3"], Some(HOMEPAGE)));
        let state = state_with(registry, FakeGithub::with_readme(README));

        let result = readme_impl(&state, params("zlib", None)).await.unwrap();
        let output: PackageReadmeOutput = parse_output(&result);

        assert_eq!(output.usage_examples.len(), 1);
        assert_eq!(output.usage_examples[0].language, "bash");
        assert_eq!(output.usage_examples[0].title, "Install");
    }

    #[tokio::test]
    async fn test_examples_skipped_on_request() {
        let registry = FakeRegistry::with_recipe(recipe("zlib", &["1.3"], Some(HOMEPAGE)));
        let state = state_with(registry, FakeGithub::with_readme(README));

        let request = GetPackageReadmeParams {
            package_name: "zlib".into(),
            version: None,
            include_examples: Some(false),
        };
        let result = readme_impl(&state, request).await.unwrap();
        let output: PackageReadmeOutput = parse_output(&result);
        assert!(output.usage_examples.is_empty());
    }

    #[tokio::test]
    async fn test_fallback_readme_when_repository_has_none() {
        let registry = FakeRegistry::with_recipe(recipe("zlib", &["1.3"], Some(HOMEPAGE)));
        let state = state_with(registry, FakeGithub::absent());

        let result = readme_impl(&state, params("zlib", None)).await.unwrap();
        let output: PackageReadmeOutput = parse_output(&result);

        assert!(output.readme_content.starts_with("# zlib"));
        assert!(output.readme_content.contains("conan install --requires=zlib/1.3@"));
        // The generated README's own fences become usage examples.
        assert!(output.usage_examples.iter().any(|e| e.language == "cmake"));
        assert!(output.usage_examples.iter().any(|e| e.language == "bash"));
    }

    #[tokio::test]
    async fn test_fallback_readme_without_homepage() {
        let registry = FakeRegistry::with_recipe(recipe("zlib", &["1.3"], None));
        let github = FakeGithub::with_readme(README);
        let state = state_with(registry, github.clone());

        let result = readme_impl(&state, params("zlib", None)).await.unwrap();
        let output: PackageReadmeOutput = parse_output(&result);

        // No homepage means the README API is never consulted.
        assert_eq!(github.call_count(), 0);
        assert!(output.readme_content.starts_with("# zlib"));
    }

    #[tokio::test]
    async fn test_explicit_version_resolves() {
        let registry = FakeRegistry::with_recipe(recipe("zlib", &["1.2.13", "1.3"], None));
        let state = state_with(registry, FakeGithub::absent());

        let result = readme_impl(&state, params("zlib", Some("1.2.13"))).await.unwrap();
        let output: PackageReadmeOutput = parse_output(&result);
        assert_eq!(output.version, "1.2.13");
        assert_eq!(output.installation.conan, "conan install --requires=zlib/1.2.13@");
    }

    #[tokio::test]
    async fn test_unknown_version_is_an_error() {
        let registry = FakeRegistry::with_recipe(recipe("zlib", &["1.3"], None));
        let state = state_with(registry, FakeGithub::absent());

        let result = readme_impl(&state, params("zlib", Some("9.9"))).await;
        let err = result.expect_err("unknown version must fail");
        assert!(err.message.contains("VERSION_NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_missing_package_is_a_negative_response() {
        let registry = FakeRegistry::not_found();
        let state = state_with(registry.clone(), FakeGithub::absent());

        let result = readme_impl(&state, params("nosuchpkg", None)).await.unwrap();
        let output: PackageReadmeOutput = parse_output(&result);

        assert!(!output.exists);
        assert_eq!(output.version, "latest");
        assert!(output.readme_content.is_empty());
        assert_eq!(output.installation.conan, "conan install --requires=nosuchpkg/latest@");

        // Second lookup inside the negative TTL is served from cache.
        let calls_after_first = registry.call_count();
        let result = readme_impl(&state, params("nosuchpkg", None)).await.unwrap();
        let second: PackageReadmeOutput = parse_output(&result);
        assert_eq!(second, output);
        assert_eq!(registry.call_count(), calls_after_first);
    }

    #[tokio::test]
    async fn test_readme_cached_per_requested_version() {
        let registry = FakeRegistry::with_recipe(recipe("zlib", &["1.2.13", "1.3"], None));
        let state = state_with(registry.clone(), FakeGithub::absent());

        readme_impl(&state, params("zlib", None)).await.unwrap();
        let calls_after_latest = registry.call_count();

        // Same requested version hits the cache.
        readme_impl(&state, params("zlib", None)).await.unwrap();
        assert_eq!(registry.call_count(), calls_after_latest);

        // A different requested version is a distinct cache entry.
        readme_impl(&state, params("zlib", Some("1.2.13"))).await.unwrap();
        assert!(registry.call_count() > calls_after_latest);
    }
}

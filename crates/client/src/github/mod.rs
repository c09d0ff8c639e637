//! GitHub README client.
//!
//! Fetches repository READMEs through the GitHub README API. Absence is the
//! common case here (no homepage, non-GitHub homepage, no README), so the
//! lookup surface returns `Option` rather than errors; failures are logged
//! and read as absent.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::header;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Default GitHub API base URL.
const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "conan-mcp/0.1";

/// Source of README text, as consumed by the request handlers.
#[async_trait]
pub trait ReadmeSource: Send + Sync {
    /// README markdown for a repository URL, or `None` when unavailable.
    async fn readme_content(&self, repository_url: &str) -> Option<String>;
}

/// GitHub API client configuration.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// API base URL (default: https://api.github.com).
    pub base_url: String,
    /// Request timeout (default: 10s).
    pub timeout: Duration,
    /// User-agent string (default: conan-mcp/0.x).
    pub user_agent: String,
    /// Optional bearer token for authenticated requests.
    pub token: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            token: None,
        }
    }
}

/// Owner/repository pair extracted from a GitHub URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

/// README API response payload.
#[derive(Debug, Deserialize)]
struct ReadmePayload {
    content: String,
    encoding: String,
}

/// GitHub README client.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    config: GitHubConfig,
}

impl GitHubClient {
    /// Create a new GitHub client with the given configuration.
    pub fn new(config: GitHubConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// Fetch and decode a repository's README, or `None` when unavailable.
    pub async fn readme_for(&self, repository_url: &str) -> Option<String> {
        let Some(repo) = parse_repo_url(repository_url) else {
            tracing::debug!(url = repository_url, "not a GitHub repository URL");
            return None;
        };

        let url = format!("{}/repos/{}/{}/readme", self.config.base_url, repo.owner, repo.repo);
        tracing::debug!(%url, "fetching README");

        let response = match self.request(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(%url, %err, "README fetch failed");
                return None;
            }
        };

        let status = response.status();
        if status.as_u16() == 404 {
            tracing::debug!(owner = %repo.owner, repo = %repo.repo, "README not found");
            return None;
        }
        if !status.is_success() {
            tracing::debug!(%url, status = status.as_u16(), "README fetch returned error status");
            return None;
        }

        let payload: ReadmePayload = match response.json().await {
            Ok(payload) => payload,
            Err(err) => {
                tracing::debug!(%url, %err, "README payload did not parse");
                return None;
            }
        };

        let content = decode_readme(&payload)?;
        tracing::debug!(chars = content.len(), owner = %repo.owner, repo = %repo.repo, "fetched README");
        Some(content)
    }

    /// Whether a repository exists, via a HEAD probe.
    pub async fn repository_exists(&self, repository_url: &str) -> bool {
        let Some(repo) = parse_repo_url(repository_url) else {
            return false;
        };

        let url = format!("{}/repos/{}/{}", self.config.base_url, repo.owner, repo.repo);
        match self.http.head(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::debug!(%url, %err, "repository probe failed");
                false
            }
        }
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/vnd.github.v3+json")
            .header(header::USER_AGENT, &self.config.user_agent);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }
        request
    }
}

#[async_trait]
impl ReadmeSource for GitHubClient {
    async fn readme_content(&self, repository_url: &str) -> Option<String> {
        self.readme_for(repository_url).await
    }
}

/// Extract owner and repository from a github.com URL.
///
/// Returns `None` for other hosts, malformed URLs, or paths without both
/// segments. A trailing `.git` on the repository name is stripped.
pub fn parse_repo_url(repository_url: &str) -> Option<RepoRef> {
    let parsed = Url::parse(repository_url).ok()?;
    if parsed.host_str() != Some("github.com") {
        return None;
    }

    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());
    let owner = segments.next()?.to_string();
    let repo = segments.next()?.trim_end_matches(".git").to_string();
    Some(RepoRef { owner, repo })
}

/// Decode the base64 README payload, tolerating the line breaks GitHub
/// inserts into the encoded body.
fn decode_readme(payload: &ReadmePayload) -> Option<String> {
    if payload.encoding != "base64" {
        tracing::warn!(encoding = %payload.encoding, "unexpected README encoding");
        return None;
    }

    let compact: String = payload.content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = BASE64.decode(compact).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repo_url() {
        assert_eq!(
            parse_repo_url("https://github.com/madler/zlib"),
            Some(RepoRef { owner: "madler".into(), repo: "zlib".into() })
        );
        assert_eq!(
            parse_repo_url("https://github.com/madler/zlib.git"),
            Some(RepoRef { owner: "madler".into(), repo: "zlib".into() })
        );
        assert_eq!(
            parse_repo_url("https://github.com/fmtlib/fmt/tree/master/doc"),
            Some(RepoRef { owner: "fmtlib".into(), repo: "fmt".into() })
        );
    }

    #[test]
    fn test_parse_repo_url_rejects_non_github() {
        assert_eq!(parse_repo_url("https://gitlab.com/owner/repo"), None);
        assert_eq!(parse_repo_url("https://github.com/owner"), None);
        assert_eq!(parse_repo_url("not a url"), None);
        assert_eq!(parse_repo_url(""), None);
    }

    #[test]
    fn test_decode_readme() {
        // "# zlib\n" with the newline GitHub inserts mid-body.
        let payload = ReadmePayload { content: "IyB6\nbGliCg==".into(), encoding: "base64".into() };
        assert_eq!(decode_readme(&payload), Some("# zlib\n".to_string()));
    }

    #[test]
    fn test_decode_readme_unexpected_encoding() {
        let payload = ReadmePayload { content: "IyB6bGliCg==".into(), encoding: "utf-8".into() };
        assert_eq!(decode_readme(&payload), None);
    }

    #[tokio::test]
    async fn test_readme_for_invalid_url_is_absent_without_network() {
        let client = GitHubClient::new(GitHubConfig::default()).expect("client builds");
        assert_eq!(client.readme_for("https://example.com/owner/repo").await, None);
        assert!(!client.repository_exists("not a url").await);
    }
}

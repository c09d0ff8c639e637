//! Recipe-index response types and version ordering.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// One entry of a GitHub contents-API directory listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentsEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ContentsEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == "dir"
    }
}

/// Summary of one package in a search listing.
///
/// The contents API only exposes folder names, so the descriptive fields are
/// filled with the index's placeholder metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSummary {
    pub name: String,
    pub description: String,
    pub topics: Vec<String>,
    pub license: String,
    pub author: String,
    pub homepage: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub latest_version: String,
}

/// Search listing with its total match count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub results: Vec<PackageSummary>,
    pub total_count: usize,
}

/// Resolved recipe metadata for one package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeInfo {
    pub name: String,
    pub latest_version: String,
    /// Version folders present in the recipe, unordered.
    pub versions: Vec<String>,
    pub description: String,
    pub license: String,
    pub author: String,
    pub homepage: Option<String>,
    pub topics: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl RecipeInfo {
    pub fn has_version(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v == version)
    }
}

/// Recipe metadata narrowed to a single version.
///
/// Requires and options would come from parsing the recipe file itself,
/// which this client does not do; they stay empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDetails {
    pub name: String,
    pub version: String,
    pub description: String,
    pub license: String,
    pub author: String,
    pub homepage: Option<String>,
    pub topics: Vec<String>,
    pub requires: Option<Vec<String>>,
    pub options: Option<serde_json::Value>,
}

pub(crate) fn placeholder_summary(name: &str) -> PackageSummary {
    let now = Utc::now().to_rfc3339();
    PackageSummary {
        name: name.to_string(),
        description: format!("Conan package for {name}"),
        topics: Vec::new(),
        license: "Unknown".to_string(),
        author: "Conan Center".to_string(),
        homepage: None,
        created_at: now.clone(),
        updated_at: now,
        latest_version: "unknown".to_string(),
    }
}

/// Whether a folder name looks like a version ("major.minor" prefix).
pub(crate) fn is_version_folder(name: &str) -> bool {
    let mut parts = name.splitn(2, '.');
    let major_ok = parts.next().is_some_and(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));
    let minor_ok = parts
        .next()
        .is_some_and(|rest| rest.bytes().next().is_some_and(|b| b.is_ascii_digit()));
    major_ok && minor_ok
}

/// Ordering key: numeric (major, minor), unparsable components as zero.
fn version_sort_key(version: &str) -> (u64, u64) {
    let mut parts = version.split('.');
    let major = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let minor = parts
        .next()
        .map(|p| {
            let digits: String = p.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().unwrap_or(0)
        })
        .unwrap_or(0);
    (major, minor)
}

/// Pick the newest version by major.minor ordering.
pub(crate) fn latest_version(versions: &[String]) -> Option<&str> {
    versions
        .iter()
        .max_by_key(|v| version_sort_key(v))
        .map(String::as_str)
}

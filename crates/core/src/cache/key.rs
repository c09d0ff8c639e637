//! Canonical cache-key construction.
//!
//! Identical logical requests must collide in the cache and distinct ones
//! must not, across process runs. Search queries are base64-encoded so
//! delimiter characters in user input cannot produce colliding keys and the
//! key stays ASCII-safe.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::NaiveDate;

/// Key for a package's resolved metadata.
pub fn package_info(package_name: &str, version: &str) -> String {
    format!("pkg_info:{package_name}:{version}")
}

/// Key for a package's README payload.
pub fn package_readme(package_name: &str, version: &str) -> String {
    format!("pkg_readme:{package_name}:{version}")
}

/// Key for a search-results page.
pub fn search_results(query: &str, limit: u32) -> String {
    format!("search:{}:{limit}", BASE64.encode(query))
}

/// Search key with a per-day discriminator, for callers that want results
/// scoped to a calendar date.
pub fn search_results_on(query: &str, limit: u32, date: NaiveDate) -> String {
    format!("{}:{date}", search_results(query, limit))
}

/// Key for a single recipe revision's details.
pub fn recipe_details(package_name: &str, version: &str) -> String {
    format!("recipe:{package_name}:{version}")
}

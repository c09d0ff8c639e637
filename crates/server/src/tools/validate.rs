//! Tool parameter validation.
//!
//! Shape checks raised immediately as `INVALID_INPUT`, before any cache or
//! network interaction. Never retried.

use conan_mcp_core::Error;

/// Default search-result limit.
const DEFAULT_LIMIT: usize = 20;

/// Maximum search-result limit.
const MAX_LIMIT: u32 = 100;

/// Maximum search-query length in characters.
const MAX_QUERY_LEN: usize = 200;

/// Validate a package name: non-empty, `[A-Za-z0-9._-]+`.
pub fn package_name(raw: &str) -> Result<String, Error> {
    if raw.trim().is_empty() {
        return Err(Error::InvalidInput("package name cannot be empty".to_string()));
    }
    if !is_name_charset(raw) {
        return Err(Error::InvalidInput(
            "package name contains invalid characters; only letters, numbers, dots, hyphens, and underscores are allowed"
                .to_string(),
        ));
    }
    Ok(raw.to_string())
}

/// Validate an optional version string with the same charset as names.
///
/// Absent or blank versions read as `None`, which callers default to
/// "latest".
pub fn version(raw: Option<&str>) -> Result<Option<String>, Error> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    if !is_name_charset(raw) {
        return Err(Error::InvalidInput("version contains invalid characters".to_string()));
    }
    Ok(Some(raw.to_string()))
}

/// Validate a search query: trimmed, 1-200 characters.
pub fn search_query(raw: &str) -> Result<String, Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("search query cannot be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_QUERY_LEN {
        return Err(Error::InvalidInput(
            "search query is too long (maximum 200 characters)".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Validate a search limit: 1-100, defaulting to 20.
pub fn limit(raw: Option<u32>) -> Result<usize, Error> {
    match raw {
        None => Ok(DEFAULT_LIMIT),
        Some(0) => Err(Error::InvalidInput("limit must be at least 1".to_string())),
        Some(n) if n > MAX_LIMIT => {
            Err(Error::InvalidInput("limit cannot exceed 100".to_string()))
        }
        Some(n) => Ok(n as usize),
    }
}

fn is_name_charset(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

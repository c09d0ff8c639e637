//! README text extraction.
//!
//! Heuristic, non-exhaustive scraping of markdown for usage examples and a
//! short package description. These helpers never fail, they just find
//! less.

pub mod examples;

use serde::{Deserialize, Serialize};

pub use examples::parse_usage_examples;

/// One fenced code block lifted from a README, with nearby context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageExample {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub code: String,
    /// Fence language tag, normalized ("cmake", "cpp", "python", "bash").
    pub language: String,
}

/// First substantial paragraph of a README, skipping headings, code fences,
/// and images. Falls back to a generic description.
pub fn package_description(readme: &str) -> String {
    let mut in_code_block = false;
    let mut found_title = false;

    for line in readme.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("```") {
            in_code_block = !in_code_block;
            continue;
        }
        if in_code_block {
            continue;
        }
        if trimmed.starts_with('#') {
            found_title = true;
            continue;
        }
        if found_title && trimmed.len() > 20 && !trimmed.starts_with("![") {
            return trimmed.to_string();
        }
    }

    "Conan package".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_description_first_paragraph() {
        let readme = "# zlib\n\n![badge](x.png)\n\nA massively spiffy yet delicately unobtrusive compression library.\n\nMore text.";
        assert_eq!(
            package_description(readme),
            "A massively spiffy yet delicately unobtrusive compression library."
        );
    }

    #[test]
    fn test_package_description_skips_code_blocks() {
        let readme = "# pkg\n```\nsome code line that is quite long indeed\n```\nThis paragraph describes the package properly.";
        assert_eq!(package_description(readme), "This paragraph describes the package properly.");
    }

    #[test]
    fn test_package_description_requires_a_heading_first() {
        let readme = "Just a stray line of text that is long enough.";
        assert_eq!(package_description(readme), "Conan package");
    }

    #[test]
    fn test_package_description_fallback() {
        assert_eq!(package_description(""), "Conan package");
        assert_eq!(package_description("# title only"), "Conan package");
    }
}

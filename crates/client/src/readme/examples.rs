//! Fenced-code-block scanning for usage examples.
//!
//! Four scans cover the block kinds a Conan package README typically
//! carries: CMake integration, C++ snippets, conanfile excerpts, and shell
//! installation commands. Results come back in document order.

use std::sync::LazyLock;

use regex::Regex;

use super::UsageExample;

static CMAKE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```cmake[ \t]*\n(.*?)\n```").unwrap());

static CPP_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```(?:cpp|c\+\+|cxx)[ \t]*\n(.*?)\n```").unwrap());

// Python blocks only count when they mention a conanfile.
static CONANFILE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```(?:python|py)[ \t]*\n(.*?conanfile.*?)\n```").unwrap());

// Shell blocks only count when they invoke conan.
static INSTALL_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```(?:bash|shell|sh)[ \t]*\n(.*?conan.*?)\n```").unwrap());

static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)#+\s*([^\n]+?)\s*$").unwrap());

static BOLD_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)\*\*([^*\n]+)\*\*\s*$").unwrap());

/// How far back to look for a title above a code block.
const TITLE_WINDOW: usize = 500;

/// How far back to look for descriptive prose above a code block.
const DESCRIPTION_WINDOW: usize = 300;

/// Scan markdown for usage examples, in document order.
pub fn parse_usage_examples(content: &str) -> Vec<UsageExample> {
    let mut found: Vec<(usize, UsageExample)> = Vec::new();
    found.extend(scan(&CMAKE_BLOCK, content, "cmake", "CMake Usage"));
    found.extend(scan(&CPP_BLOCK, content, "cpp", "C++ Usage"));
    found.extend(scan(&CONANFILE_BLOCK, content, "python", "Conanfile Usage"));
    found.extend(scan(&INSTALL_BLOCK, content, "bash", "Installation"));

    found.sort_by_key(|(at, _)| *at);
    tracing::debug!(count = found.len(), "parsed usage examples");
    found.into_iter().map(|(_, example)| example).collect()
}

fn scan(
    block: &Regex,
    content: &str,
    language: &str,
    default_title: &str,
) -> Vec<(usize, UsageExample)> {
    block
        .captures_iter(content)
        .filter_map(|caps| {
            let code = caps.get(1)?.as_str().trim();
            if code.is_empty() {
                return None;
            }
            let at = caps.get(0)?.start();
            Some((
                at,
                UsageExample {
                    title: example_title(content, at).unwrap_or_else(|| default_title.to_string()),
                    description: example_description(content, at),
                    code: code.to_string(),
                    language: language.to_string(),
                },
            ))
        })
        .collect()
}

/// Nearest heading or bold line in the window above a code block.
fn example_title(content: &str, at: usize) -> Option<String> {
    let window = window_before(content, at, TITLE_WINDOW);

    if let Some(caps) = HEADING.captures_iter(window).last() {
        return Some(caps[1].trim().to_string());
    }
    if let Some(caps) = BOLD_LINE.captures_iter(window).last() {
        return Some(caps[1].trim().to_string());
    }
    None
}

/// Prose between the title and the code block, rebuilt bottom-up.
fn example_description(content: &str, at: usize) -> Option<String> {
    let window = window_before(content, at, DESCRIPTION_WINDOW);
    let mut description = String::new();

    for line in window.lines().rev() {
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("```") {
            if !description.is_empty() {
                break;
            }
            continue;
        }

        description = if description.is_empty() {
            trimmed.to_string()
        } else {
            format!("{trimmed} {description}")
        };
        if description.len() > 200 {
            break;
        }
    }

    (description.len() > 10).then_some(description)
}

fn window_before(content: &str, end: usize, max: usize) -> &str {
    let mut start = end.saturating_sub(max);
    while !content.is_char_boundary(start) {
        start += 1;
    }
    &content[start..end]
}

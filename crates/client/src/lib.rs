//! Client code for mcp-conan.
//!
//! This crate provides the recipe-index and GitHub README HTTP clients plus
//! the README example extractor shared by the server.

pub mod github;
pub mod readme;
pub mod registry;

pub use github::{GitHubClient, GitHubConfig, ReadmeSource};
pub use readme::{UsageExample, package_description, parse_usage_examples};
pub use registry::{
    ConanCenterClient, PackageSummary, RecipeDetails, RecipeInfo, RecipeSource, RegistryConfig,
    RegistryError, SearchResults,
};

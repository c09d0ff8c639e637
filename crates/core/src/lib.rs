//! Core types and shared functionality for mcp-conan.
//!
//! This crate provides:
//! - In-memory TTL+LRU cache with an estimated-byte ceiling
//! - Deterministic cache-key builders
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheOptions, CacheStats, MemoryCache};
pub use config::AppConfig;
pub use error::Error;

//! cache_stats tool implementation.
//!
//! Reports the in-process cache's occupancy next to its configured limits.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::handler::AppState;

/// Output from the cache_stats tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStatsOutput {
    /// Entries currently held, including not-yet-swept expired ones.
    pub size: usize,
    /// Summed estimated entry size in bytes.
    pub memory_usage: usize,
    /// Hit-rate tracking is not implemented; always zero.
    pub hit_rate: f64,
    /// Configured byte ceiling.
    pub max_bytes: usize,
    /// Configured default TTL in seconds.
    pub default_ttl_secs: u64,
}

/// Implementation of the cache_stats tool.
pub async fn stats_impl(state: &AppState) -> Result<CallToolResult, McpError> {
    let stats = state.cache.stats();
    let output = CacheStatsOutput {
        size: stats.size,
        memory_usage: stats.memory_usage,
        hit_rate: stats.hit_rate,
        max_bytes: state.config.cache_max_bytes,
        default_ttl_secs: state.config.cache_ttl_secs,
    };

    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(&output).unwrap_or_default(),
    )]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{FakeGithub, FakeRegistry, parse_output, state_with};

    #[tokio::test]
    async fn test_stats_report_occupancy_and_limits() {
        let state = state_with(FakeRegistry::not_found(), FakeGithub::absent());
        state.cache.set("k1", 1u8, None);
        state.cache.set("k2", "payload".to_string(), None);

        let result = stats_impl(&state).await.unwrap();
        let output: CacheStatsOutput = parse_output(&result);

        assert_eq!(output.size, 2);
        assert!(output.memory_usage > 0);
        assert_eq!(output.hit_rate, 0.0);
        assert_eq!(output.max_bytes, state.config.cache_max_bytes);
        assert_eq!(output.default_ttl_secs, state.config.cache_ttl_secs);
    }

    #[tokio::test]
    async fn test_stats_on_empty_cache() {
        let state = state_with(FakeRegistry::not_found(), FakeGithub::absent());
        let result = stats_impl(&state).await.unwrap();
        let output: CacheStatsOutput = parse_output(&result);
        assert_eq!(output.size, 0);
        assert_eq!(output.memory_usage, 0);
    }
}

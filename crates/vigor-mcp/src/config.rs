//! Configuration management for the MCP server

use config::builder::{ConfigBuilder, DefaultState};
use serde::Deserialize;
use vigor_core::InsightPolicy;

use crate::error::Result;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub policy: InsightPolicy,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Tracing filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "vigor_mcp=info".to_string()
}

impl AppConfig {
    /// Load configuration from `vigor-mcp.toml` and `VIGOR__*` environment variables
    pub fn load() -> Result<Self> {
        let settings = Self::defaults()?
            // Load from file if present
            .add_source(config::File::with_name("vigor-mcp").required(false))
            // e.g. VIGOR__POLICY__TOP_K=5
            .add_source(
                config::Environment::with_prefix("VIGOR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Builder holding only the built-in defaults
    fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        let policy = InsightPolicy::default();
        Ok(config::Config::builder()
            .set_default("server.log_filter", default_log_filter())?
            .set_default("policy.top_k", policy.top_k as i64)?
            .set_default("policy.matrix_min_n", policy.matrix_min_n as i64)?
            .set_default("policy.matrix_min_abs_r", policy.matrix_min_abs_r)?
            .set_default("policy.trend_threshold", policy.trend_threshold)?
            .set_default("policy.habit_window_days", policy.habit_window_days)?
            .set_default("policy.pattern_window_days", policy.pattern_window_days)?)
    }
}

//! Vigor MCP Server
//!
//! Model Context Protocol server exposing the Vigor correlation and insight
//! engine to AI agents.
//!
//! # Tools
//!
//! - **Statistics**: Pearson and Spearman correlation with p-values
//! - **Habits**: Mood and energy lift per habit, pillar correlation matrix
//! - **Insights**: Ranked pattern insights, weekly digest, post-check-in message
//! - **Gut health**: FODMAP exposure vs symptom correlations
//!
//! Callers pass the rows they already fetched; the server never touches
//! storage and answers one request at a time.

mod config;
mod error;
mod payload;
mod tools;

use std::io::{self, BufRead, Write};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{AppConfig, ServerConfig};
use crate::tools::{handle_request, JsonRpcRequest, VigorTools};

fn main() -> anyhow::Result<()> {
    // Configuration first so it can supply the default log filter
    let loaded = AppConfig::load();
    let log_filter = loaded
        .as_ref()
        .map(|c| c.server.log_filter.clone())
        .unwrap_or_else(|_| ServerConfig::default().log_filter);

    // Initialize logging to stderr (stdout is for MCP protocol)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Vigor MCP Server v{}", env!("CARGO_PKG_VERSION"));

    let config = loaded
        .map_err(|e| {
            tracing::warn!(error = %e, "Using default configuration");
            e
        })
        .unwrap_or_default();

    tracing::info!(
        top_k = config.policy.top_k,
        matrix_min_n = config.policy.matrix_min_n,
        habit_window_days = config.policy.habit_window_days,
        pattern_window_days = config.policy.pattern_window_days,
        "Configuration loaded"
    );

    let tools = VigorTools::new(config.policy);

    tracing::info!("MCP server ready, listening on stdio");

    // Main loop: read JSON-RPC requests from stdin, write responses to stdout
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(error = %e, "Error reading stdin");
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let request: JsonRpcRequest = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, line = %line, "Error parsing request");
                continue;
            }
        };

        tracing::debug!(method = %request.method, "Received request");

        // Notifications don't get responses
        if let Some(response) = handle_request(&tools, request) {
            let response_str = serde_json::to_string(&response)?;
            if let Err(e) = writeln!(stdout, "{}", response_str) {
                tracing::error!(error = %e, "Error writing response");
            }
            if let Err(e) = stdout.flush() {
                tracing::error!(error = %e, "Error flushing stdout");
            }
        }
    }

    tracing::info!("MCP server shutting down");
    Ok(())
}

//! Error types for the MCP server

use thiserror::Error;
use vigor_core::VigorError;

#[derive(Error, Debug)]
pub enum McpError {
    #[error("{0}")]
    Core(#[from] VigorError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, McpError>;

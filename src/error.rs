use thiserror::Error;

/// Errors raised while driving the browser, harvesting a table or exporting it
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("JavaScript evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Failed to capture page snapshot: {0}")]
    SnapshotFailed(String),

    #[error("Tool '{tool}' failed: {reason}")]
    ToolExecutionFailed { tool: String, reason: String },

    #[error("Unknown tool: {0}")]
    ToolNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Harvest cancelled")]
    Cancelled,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HarvestError>;

/// Failure reported by an external [`DeckAnalyzer`](crate::analyzer::DeckAnalyzer).
///
/// Kept separate from [`OptimizerError`] so an analyzer outage can never be
/// mistaken for a deck change with no impact.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalyzerError {
    #[error("deck analysis failed: {0}")]
    Failed(String),

    #[error("deck analysis timed out")]
    TimedOut,
}

#[derive(Debug, thiserror::Error)]
pub enum OptimizerError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Upstream analyzer failure: {0}")]
    UpstreamAnalyzer(#[from] AnalyzerError),

    #[error("optimization cancelled")]
    Cancelled,

    #[error("optimization deadline exceeded")]
    DeadlineExceeded,
}

pub type Result<T> = std::result::Result<T, OptimizerError>;

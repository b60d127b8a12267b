use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    /// Backtracking ran out of candidates. Unreachable while the single-cell
    /// fallback is in the candidate list, but fatal if it ever happens.
    #[error("tile generation exhausted every candidate starting from ({row}, {col})")]
    Exhausted { row: usize, col: usize },
    #[error("generation start ({row}, {col}) lies outside the {height}x{width} tile grid")]
    StartOutOfBounds {
        row: usize,
        col: usize,
        height: usize,
        width: usize,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

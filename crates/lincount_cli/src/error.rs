//! Error types for the command line driver

use lincount_core::CountError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Count(#[from] CountError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: not an integer: {token:?}")]
    MatrixEntry { path: PathBuf, line: usize, token: String },

    #[error("{0} holds no matrix rows")]
    EmptyFile(PathBuf),

    #[error("right-hand side entry is not an integer: {0:?}")]
    RhsEntry(String),

    #[error("the sq method needs a square table with uniform margins, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("counters disagree on {rhs:?}: {detail}")]
    Disagreement { rhs: Vec<i64>, detail: String },
}

pub type Result<T> = std::result::Result<T, CliError>;

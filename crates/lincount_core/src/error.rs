//! Error types for the counting engine

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CountError {
    #[error("matrix has no rows or no columns")]
    EmptyMatrix,

    #[error("matrix row {row} has {actual} entries, expected {expected}")]
    RaggedMatrix {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("matrix entry ({row}, {col}) is negative: {value}")]
    NegativeMatrixEntry { row: usize, col: usize, value: i64 },

    #[error("matrix column {0} is all zero (unbounded or empty system)")]
    ZeroColumn(usize),

    #[error("A x = 0 has a non-zero non-negative solution (unbounded solution set)")]
    UnboundedCone,

    #[error("zero/one solution table does not respect the problem's symmetries")]
    AsymmetricZeroOneTable,

    #[error("invalid problem: {0}")]
    InvalidProblem(String),

    #[error("right-hand side entry {index} is negative: {value}")]
    NegativeTarget { index: usize, value: i64 },

    #[error("right-hand side has {actual} entries, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, CountError>;

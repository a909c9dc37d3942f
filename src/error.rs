//! Error types for the surface FEM core

use thiserror::Error;

/// Main error type for numerical-core operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FemError {
    #[error("dimension mismatch in {op}: expected {expected}, got {actual}")]
    DimensionMismatch {
        op: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid subdivision {0}: must satisfy 1 <= subdiv < 2^20")]
    InvalidSubdivision(usize),

    #[error("multigrid hierarchy requires subdiv to be a multiple of 8, got {0}")]
    NonUniformHierarchy(usize),

    #[error("singular search direction in {op}: denominator is zero")]
    SingularDirection { op: &'static str },

    #[error("matrix is not positive definite: negative pivot at row {row}")]
    NotPositiveDefinite { row: usize },

    #[error("cholesky state not factored: call compute() before solve()")]
    NotFactored,
}

/// Result type for numerical-core operations
pub type FemResult<T> = Result<T, FemError>;

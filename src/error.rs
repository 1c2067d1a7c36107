use thiserror::Error;

/// Dimension errors raised while constructing matrix operations.
///
/// Raised before anything is recorded on the tape, so a failed construction
/// leaves the graph exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    /// Operation requires a square matrix.
    #[error("{op}: expected a square matrix, got {rows}x{cols}")]
    NotSquare {
        op: &'static str,
        rows: usize,
        cols: usize,
    },

    /// Inner dimensions of a product or solve do not agree.
    #[error("{op}: cannot multiply {lhs_rows}x{lhs_cols} by {rhs_rows}x{rhs_cols}")]
    NotMultiplicable {
        op: &'static str,
        lhs_rows: usize,
        lhs_cols: usize,
        rhs_rows: usize,
        rhs_cols: usize,
    },

    /// Two operands must have the same size.
    #[error("{op}: size mismatch, {lhs} vs {rhs}")]
    SizeMismatch {
        op: &'static str,
        lhs: usize,
        rhs: usize,
    },

    /// Operation requires a row or column vector.
    #[error("{op}: expected a vector, got {rows}x{cols}")]
    NotVector {
        op: &'static str,
        rows: usize,
        cols: usize,
    },
}

/// Result alias for matrix construction entry points.
pub type Result<T> = std::result::Result<T, MatrixError>;

//! Error types for the data model.

use thiserror::Error;

/// Errors raised when a surface or volume would violate its invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    /// No field with the requested name exists.
    #[error("scalar field not found: {name}")]
    FieldNotFound {
        /// Requested field name.
        name: String,
    },

    /// A single field was requested but several exist.
    #[error("expected exactly one scalar field, found {count}")]
    AmbiguousField {
        /// Number of fields present.
        count: usize,
    },

    /// Field length does not match the point count.
    #[error("field '{name}' has {got} values, expected {expected}")]
    FieldLengthMismatch {
        /// Field name.
        name: String,
        /// Point count of the owning geometry.
        expected: usize,
        /// Length of the offending field.
        got: usize,
    },

    /// A triangle references a point that does not exist.
    #[error("triangle {triangle} references point {index}, but only {point_count} points exist")]
    TriangleIndexOutOfBounds {
        /// Index of the offending triangle.
        triangle: usize,
        /// The invalid point index.
        index: u32,
        /// Number of points available.
        point_count: usize,
    },

    /// A wedge cell references a point that does not exist.
    #[error("cell {cell} references point {index}, but only {point_count} points exist")]
    CellIndexOutOfBounds {
        /// Index of the offending cell.
        cell: usize,
        /// The invalid point index.
        index: u32,
        /// Number of points available.
        point_count: usize,
    },

    /// Replacement coordinates do not match the existing point count.
    #[error("expected {expected} points, got {got}")]
    PointCountMismatch {
        /// Existing point count.
        expected: usize,
        /// Provided point count.
        got: usize,
    },
}

/// Result type for data model operations.
pub type TypesResult<T> = Result<T, TypesError>;

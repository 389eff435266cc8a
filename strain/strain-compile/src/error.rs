//! Error types for data compilation.

use strain_types::TypesError;
use thiserror::Error;

/// Errors that can occur while compiling receiver and donor data.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Receiver and donor have different point counts.
    #[error("receiver has {receiver} points but donor has {donor}")]
    PointCountMismatch {
        /// Receiver point count.
        receiver: usize,
        /// Donor point count.
        donor: usize,
    },

    /// Receiver and donor triangle lists differ.
    #[error("receiver and donor topology differ at triangle {triangle}")]
    TopologyMismatch {
        /// First triangle index at which the lists differ.
        triangle: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A field could not be resolved or attached.
    #[error(transparent)]
    Types(#[from] TypesError),
}

/// Result type for compile operations.
pub type CompileResult<T> = Result<T, CompileError>;

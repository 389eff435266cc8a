//! Error types for volume extrusion and probing.

use strain_types::TypesError;
use thiserror::Error;

/// Errors that can occur while building or probing a wedge volume.
#[derive(Debug, Error)]
pub enum VolumeError {
    /// Extrusion direction has zero length or non-finite components.
    #[error("invalid extrusion direction ({x}, {y}, {z})")]
    InvalidDirection {
        /// X component.
        x: f64,
        /// Y component.
        y: f64,
        /// Z component.
        z: f64,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Input surface or volume violated a data model invariant.
    #[error(transparent)]
    Types(#[from] TypesError),
}

/// Result type for volume operations.
pub type VolumeResult<T> = Result<T, VolumeError>;

//! Error types for surface alignment.

use strain_types::TypesError;
use thiserror::Error;

/// Errors that can occur while aligning two surfaces.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Receiver (moving) surface or point set has no points.
    #[error("receiver surface has no points")]
    EmptyReceiver,

    /// Donor (fixed) surface or point set has no points.
    #[error("donor surface has no points")]
    EmptyDonor,

    /// SVD computation failed during transform estimation.
    #[error("SVD computation failed during transform estimation")]
    SvdFailed,

    /// Landmarks are coincident or collinear, so no unique rotation exists.
    #[error("{side} landmarks are collinear or coincident")]
    DegenerateLandmarks {
        /// Which surface's landmarks are degenerate ("receiver" or "donor").
        side: &'static str,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The aligned surface could not be rebuilt.
    #[error(transparent)]
    Types(#[from] TypesError),
}

/// Result type for registration operations.
pub type RegistrationResult<T> = Result<T, RegistrationError>;

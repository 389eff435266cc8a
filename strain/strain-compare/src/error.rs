//! Error type for the comparison pipeline.

use std::path::PathBuf;

use strain_compile::CompileError;
use strain_io::IoError;
use strain_registration::RegistrationError;
use strain_types::TypesError;
use strain_volume::VolumeError;
use thiserror::Error;

/// Errors raised by any pipeline stage.
#[derive(Debug, Error)]
pub enum StrainError {
    /// Invalid surface or field data.
    #[error(transparent)]
    Types(#[from] TypesError),

    /// Surface alignment failed.
    #[error("alignment failed: {0}")]
    Registration(#[from] RegistrationError),

    /// Extrusion or probing failed.
    #[error("volume probing failed: {0}")]
    Volume(#[from] VolumeError),

    /// Differencing failed.
    #[error("data compilation failed: {0}")]
    Compile(#[from] CompileError),

    /// Reading or writing files failed.
    #[error(transparent)]
    Io(#[from] IoError),

    /// The configuration file could not be read.
    #[error("cannot read config {path}: {source}")]
    ConfigFile {
        /// Config path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration could not be parsed.
    #[error("invalid config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Result type for pipeline operations.
pub type StrainResult<T> = Result<T, StrainError>;

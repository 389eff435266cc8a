//! Point-by-point comparison of two strain fields measured on the same
//! specimen surface.
//!
//! The receiver (moving) surface is rigidly aligned to the donor (fixed)
//! surface, the donor is extruded into a thin wedge volume, the volume is
//! sampled at every aligned receiver point and the two fields are
//! differenced over their valid overlap. See [`compare_surfaces`].
//!
//! # Quick Start
//!
//! ```no_run
//! use strain_compare::prelude::*;
//!
//! let receiver = read_surface("drop_tower.vtp").unwrap();
//! let donor = read_surface("instron.vtp").unwrap();
//!
//! let config = PipelineConfig::default();
//! let comparison = compare_surfaces(&receiver, &donor, &config).unwrap();
//! write_vtu(comparison.compiled.surface(), "strainCompare.vtu").unwrap();
//! ```
//!
//! # Module Organization
//!
//! - [`types`] - `Surface`, `WedgeVolume`, `ScalarField`, sentinel helpers
//! - [`registration`] - rigid transforms, landmark fit, ICP
//! - [`volume`] - extrusion, wedge interpolation, probing
//! - [`compile`] - differencing and overlap filtering
//! - [`io`] - VTK XML interchange and text reports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions)]

mod config;
mod error;
mod pipeline;

pub use config::{PipelineConfig, DEFAULT_DONOR_NAME, DEFAULT_RECEIVER_NAME};
pub use error::{StrainError, StrainResult};
pub use pipeline::{compare_surfaces, AlignmentSummary, Comparison, ProbeStats};

// =============================================================================
// Re-exports
// =============================================================================

/// Core data structures.
pub use strain_types as types;

/// Rigid alignment.
pub use strain_registration as registration;

/// Extrusion and probing.
pub use strain_volume as volume;

/// Differencing and filtering.
pub use strain_compile as compile;

/// File interchange and reports.
pub use strain_io as io;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for strain comparison.
///
/// ```
/// use strain_compare::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{compare_surfaces, Comparison, PipelineConfig, StrainError, StrainResult};

    pub use strain_types::{Point3, ScalarField, Surface, Vector3, SENTINEL};

    pub use strain_registration::{IcpParams, InitialAlignment, LandmarkPairs};

    pub use strain_compile::CompiledSurface;

    pub use strain_io::{read_surface, write_report, write_vtu, Report};
}

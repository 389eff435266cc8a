//! Align, extrude, probe, compile.

use std::fmt;

use serde::Serialize;
use strain_compile::{compile_data, CompiledSurface};
use strain_registration::{align_surfaces, AlignmentResult, RigidTransform};
use strain_types::{Surface, WedgeVolume};
use strain_volume::{extrude_surface_with, probe_volume_with, ProbeResult};
use tracing::{info, info_span};

use crate::{PipelineConfig, StrainResult};

/// Outcome of the alignment stage without the moved geometry.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AlignmentSummary {
    /// Initial transform.
    pub initial: RigidTransform,
    /// ICP refinement applied after `initial`.
    pub refinement: RigidTransform,
    /// Combined transform applied to the receiver.
    pub transform: RigidTransform,
    /// ICP iterations performed.
    pub iterations: u32,
    /// Whether ICP converged.
    pub converged: bool,
    /// Final RMS nearest-point distance.
    pub rms_error: f64,
}

impl From<&AlignmentResult> for AlignmentSummary {
    fn from(result: &AlignmentResult) -> Self {
        Self {
            initial: result.initial,
            refinement: result.refinement,
            transform: result.transform,
            iterations: result.iterations,
            converged: result.converged,
            rms_error: result.rms_error,
        }
    }
}

impl fmt::Display for AlignmentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ICP iterations ({}), rms {:.6}",
            self.iterations,
            if self.converged {
                "converged"
            } else {
                "not converged"
            },
            self.rms_error
        )
    }
}

/// Counts from the probing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProbeStats {
    /// Receiver points inside the donor volume.
    pub located: usize,
    /// Receiver points outside it.
    pub outside: usize,
}

impl From<&ProbeResult> for ProbeStats {
    fn from(result: &ProbeResult) -> Self {
        Self {
            located: result.located,
            outside: result.outside,
        }
    }
}

/// Everything produced by one comparison.
#[derive(Debug, Clone)]
pub struct Comparison {
    /// Receiver values, probed donor values and their difference over the
    /// valid overlap.
    pub compiled: CompiledSurface,
    /// Alignment outcome.
    pub alignment: AlignmentSummary,
    /// Probe outcome.
    pub probe: ProbeStats,
    /// Receiver after alignment, all points and original fields.
    pub aligned: Surface,
    /// Extruded donor volume.
    pub volume: WedgeVolume,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "alignment: {}; probe: {} located, {} outside; {}",
            self.alignment, self.probe.located, self.probe.outside, self.compiled
        )
    }
}

/// Compares a receiver strain surface against a donor strain surface.
///
/// 1. The receiver is moved onto the donor (initial transform, then ICP).
/// 2. The donor is extruded into a wedge volume.
/// 3. The volume is probed at every aligned receiver point.
/// 4. Receiver and probed donor values are differenced and filtered to the
///    valid overlap.
///
/// Points of the receiver that fall outside the donor volume are not an
/// error; they are dropped by the final filter.
///
/// # Errors
///
/// Returns the first stage error: empty or degenerate input, invalid
/// parameters, unresolvable fields.
///
/// # Example
///
/// ```
/// use strain_compare::prelude::*;
///
/// let geometry = Surface::new(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(1.0, 1.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2], [0, 2, 3]],
/// )
/// .unwrap();
/// let receiver = geometry.clone().with_field("strain", vec![1.0; 4]).unwrap();
/// let donor = geometry.with_field("strain", vec![2.0; 4]).unwrap();
///
/// let comparison = compare_surfaces(&receiver, &donor, &PipelineConfig::default()).unwrap();
/// assert_eq!(comparison.compiled.point_count(), 4);
/// assert!(comparison
///     .compiled
///     .delta_values()
///     .iter()
///     .all(|d| (d - 1.0).abs() < 1e-9));
/// ```
pub fn compare_surfaces(
    receiver: &Surface,
    donor: &Surface,
    config: &PipelineConfig,
) -> StrainResult<Comparison> {
    let _span = info_span!("compare_surfaces").entered();

    let alignment = align_surfaces(receiver, donor, &config.align_params())?;
    let volume = extrude_surface_with(donor, &config.extrude_params())?;
    let probed = probe_volume_with(&volume, &alignment.surface, &config.probe_params())?;
    let compiled = compile_data(&alignment.surface, &probed.surface, &config.compile_params())?;

    let comparison = Comparison {
        alignment: AlignmentSummary::from(&alignment),
        probe: ProbeStats::from(&probed),
        compiled,
        aligned: alignment.surface,
        volume,
    };
    info!(
        kept_points = comparison.compiled.point_count(),
        outside = comparison.probe.outside,
        rms = comparison.alignment.rms_error,
        "comparison complete"
    );
    Ok(comparison)
}

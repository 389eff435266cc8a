//! Surface alignment: initial transform followed by ICP refinement.

use crate::icp::{icp_align_points, IcpParams, IcpResult};
use crate::landmark::{align_landmarks, LandmarkPairs};
use crate::{RegistrationError, RegistrationResult, RigidTransform};
use nalgebra::{Point3, Vector3};
use std::fmt;
use strain_types::Surface;
use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the receiver is placed before ICP refinement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum InitialAlignment {
    /// No initial motion.
    #[default]
    Identity,
    /// Explicit translation plus X, Y, Z rotations in degrees.
    Parameters {
        /// Translation vector.
        translation: Vector3<f64>,
        /// Rotation about X, Y and Z, in degrees.
        rotation_degrees: [f64; 3],
    },
    /// Least-squares fit of three landmark pairs.
    Landmarks(LandmarkPairs),
}

impl InitialAlignment {
    /// Resolves this placement into a transform.
    ///
    /// # Errors
    ///
    /// Fails only for [`InitialAlignment::Landmarks`], see [`align_landmarks`].
    pub fn transform(&self) -> RegistrationResult<RigidTransform> {
        match self {
            Self::Identity => Ok(RigidTransform::identity()),
            Self::Parameters {
                translation,
                rotation_degrees,
            } => Ok(RigidTransform::from_euler_degrees(
                *translation,
                *rotation_degrees,
            )),
            Self::Landmarks(pairs) => align_landmarks(pairs),
        }
    }
}

fn write_point(f: &mut fmt::Formatter<'_>, p: &Point3<f64>) -> fmt::Result {
    write!(f, "({},{},{})", p.x, p.y, p.z)
}

/// One-line description used in report headers.
impl fmt::Display for InitialAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Initial Transform. ")?;
        match self {
            Self::Identity => write!(f, "Identity"),
            Self::Parameters {
                translation: t,
                rotation_degrees: [rx, ry, rz],
            } => write!(
                f,
                "Translate ({},{},{}). Rotate ({rx},{ry},{rz})",
                t.x, t.y, t.z
            ),
            Self::Landmarks(pairs) => {
                write!(f, "Landmarks. Receiver ")?;
                for p in &pairs.receiver {
                    write_point(f, p)?;
                }
                write!(f, ". Donor ")?;
                for p in &pairs.donor {
                    write_point(f, p)?;
                }
                Ok(())
            }
        }
    }
}

/// Parameters for [`align_surfaces`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AlignParams {
    /// Initial placement of the receiver.
    pub initial: InitialAlignment,
    /// ICP refinement settings.
    pub icp: IcpParams,
}

impl AlignParams {
    /// Creates parameters with identity start and default ICP.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial placement.
    #[must_use]
    pub const fn with_initial(mut self, initial: InitialAlignment) -> Self {
        self.initial = initial;
        self
    }

    /// Sets the ICP settings.
    #[must_use]
    pub fn with_icp(mut self, icp: IcpParams) -> Self {
        self.icp = icp;
        self
    }
}

/// Outcome of [`align_surfaces`].
#[derive(Debug, Clone)]
pub struct AlignmentResult {
    /// Receiver with transformed coordinates, original topology and fields.
    pub surface: Surface,
    /// Initial transform.
    pub initial: RigidTransform,
    /// ICP refinement applied after `initial`.
    pub refinement: RigidTransform,
    /// `refinement ∘ initial`, the transform applied to the receiver.
    pub transform: RigidTransform,
    /// ICP iterations performed.
    pub iterations: u32,
    /// Whether ICP converged.
    pub converged: bool,
    /// Final RMS nearest-point distance.
    pub rms_error: f64,
}

impl fmt::Display for AlignmentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "aligned {} points in {} ICP iterations ({}), rms {:.6}",
            self.surface.point_count(),
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

/// Rigidly aligns the receiver surface onto the donor surface.
///
/// The initial transform is applied, ICP refines it against the donor's
/// points, and the composed transform is then applied once to the original
/// receiver coordinates. Topology and scalar fields are carried over
/// unchanged. Poor alignment is not an error.
///
/// # Errors
///
/// - [`RegistrationError::EmptyReceiver`] / [`RegistrationError::EmptyDonor`]
/// - [`RegistrationError::DegenerateLandmarks`] for unusable landmarks
/// - [`RegistrationError::InvalidParameter`] for bad ICP settings
/// - [`RegistrationError::SvdFailed`] if a fitting step fails
///
/// # Example
///
/// ```
/// use strain_registration::{align_surfaces, AlignParams};
/// use strain_types::{Point3, Surface};
///
/// let donor = Surface::new(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.1),
///         Point3::new(0.0, 1.0, 0.2),
///         Point3::new(1.0, 1.0, 0.4),
///     ],
///     vec![[0, 1, 2], [1, 3, 2]],
/// )
/// .unwrap();
///
/// let result = align_surfaces(&donor, &donor, &AlignParams::default()).unwrap();
/// assert!(result.transform.is_identity(1e-9));
/// ```
pub fn align_surfaces(
    receiver: &Surface,
    donor: &Surface,
    params: &AlignParams,
) -> RegistrationResult<AlignmentResult> {
    if receiver.is_empty() {
        return Err(RegistrationError::EmptyReceiver);
    }
    if donor.is_empty() {
        return Err(RegistrationError::EmptyDonor);
    }

    let initial = params.initial.transform()?;
    debug!(initial = %params.initial, "initial transform resolved");

    let placed = initial.transform_points(receiver.points());
    let icp = icp_align_points(&placed, donor.points(), &params.icp)?;
    if ran_out_of_iterations(&params.icp, &icp) {
        warn!(
            iterations = icp.iterations,
            rms = icp.rms_error,
            "ICP did not converge, using best iterate"
        );
    }

    // Apply the composition to the original points, not to `placed`
    let transform = icp.transform.compose(&initial);
    let surface = receiver.with_points(transform.transform_points(receiver.points()))?;

    if let (Some(moved), Some(fixed)) = (surface.centroid(), donor.centroid()) {
        debug!(offset = (moved - fixed).norm(), "centroid offset after alignment");
    }

    let result = AlignmentResult {
        surface,
        initial,
        refinement: icp.transform,
        transform,
        iterations: icp.iterations,
        converged: icp.converged,
        rms_error: icp.rms_error,
    };
    info!(
        points = result.surface.point_count(),
        iterations = result.iterations,
        converged = result.converged,
        rms = result.rms_error,
        "surfaces aligned"
    );
    Ok(result)
}

/// True when ICP was asked to refine and stopped without converging.
/// `max_iterations = 0` disables refinement and never counts.
fn ran_out_of_iterations(params: &IcpParams, icp: &IcpResult) -> bool {
    params.max_iterations > 0 && !icp.converged
}

//! Three-point landmark initial alignment.

use crate::kabsch::compute_rigid_transform;
use crate::{RegistrationError, RegistrationResult, RigidTransform};
use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Relative area below which a landmark triangle counts as degenerate.
const DEGENERACY_TOLERANCE: f64 = 1e-10;

/// Three corresponding points picked on each surface.
///
/// `receiver[i]` is the point on the moving surface that should land on
/// `donor[i]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LandmarkPairs {
    /// Landmarks on the receiver (moving) surface.
    pub receiver: [Point3<f64>; 3],
    /// Matching landmarks on the donor (fixed) surface.
    pub donor: [Point3<f64>; 3],
}

impl LandmarkPairs {
    /// Creates landmark pairs.
    #[must_use]
    pub const fn new(receiver: [Point3<f64>; 3], donor: [Point3<f64>; 3]) -> Self {
        Self { receiver, donor }
    }

    /// Builds landmark pairs from two flat `x, y, z` lists of nine values each,
    /// the layout used on the command line.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::InvalidParameter`] if either list does not
    /// hold exactly nine values.
    pub fn from_coords(receiver: &[f64], donor: &[f64]) -> RegistrationResult<Self> {
        Ok(Self {
            receiver: triple(receiver, "receiver")?,
            donor: triple(donor, "donor")?,
        })
    }
}

fn triple(coords: &[f64], side: &str) -> RegistrationResult<[Point3<f64>; 3]> {
    match coords {
        [ax, ay, az, bx, by, bz, cx, cy, cz] => Ok([
            Point3::new(*ax, *ay, *az),
            Point3::new(*bx, *by, *bz),
            Point3::new(*cx, *cy, *cz),
        ]),
        _ => Err(RegistrationError::InvalidParameter(format!(
            "{side} landmarks need 9 coordinates, got {}",
            coords.len()
        ))),
    }
}

/// Computes the rigid transform taking the receiver landmarks onto the donor
/// landmarks in the least-squares sense.
///
/// # Errors
///
/// Returns [`RegistrationError::DegenerateLandmarks`] if either triple is
/// collinear or has coincident points, or propagates a fitting failure.
///
/// # Example
///
/// ```
/// use strain_registration::{align_landmarks, LandmarkPairs};
/// use nalgebra::Point3;
///
/// let receiver = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let donor = receiver.map(|p| p + nalgebra::Vector3::new(0.0, 0.0, 2.0));
///
/// let transform = align_landmarks(&LandmarkPairs::new(receiver, donor)).unwrap();
/// assert!((transform.translation.z - 2.0).abs() < 1e-9);
/// ```
pub fn align_landmarks(pairs: &LandmarkPairs) -> RegistrationResult<RigidTransform> {
    check_triangle(&pairs.receiver, "receiver")?;
    check_triangle(&pairs.donor, "donor")?;
    compute_rigid_transform(&pairs.receiver, &pairs.donor)
}

fn check_triangle(points: &[Point3<f64>; 3], side: &'static str) -> RegistrationResult<()> {
    let ab = points[1] - points[0];
    let ac = points[2] - points[0];
    let scale = ab.norm_squared().max(ac.norm_squared());
    if scale <= f64::EPSILON || ab.cross(&ac).norm() <= DEGENERACY_TOLERANCE * scale {
        return Err(RegistrationError::DegenerateLandmarks { side });
    }
    Ok(())
}

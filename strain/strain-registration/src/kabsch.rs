//! Closed-form least-squares rigid fit between paired point sets.
//!
//! Used for both the landmark initial transform and each ICP step.

use crate::{RegistrationError, RegistrationResult, RigidTransform};
use nalgebra::{Matrix3, Point3, Rotation3, UnitQuaternion, Vector3};

/// Computes the rigid transform that best maps `source[i]` onto `target[i]`.
///
/// Minimizes the sum of squared distances (Kabsch / orthogonal Procrustes).
/// Reflections are corrected so the result is always a proper rotation.
///
/// # Errors
///
/// - [`RegistrationError::EmptyReceiver`] / [`RegistrationError::EmptyDonor`]
///   for empty input
/// - [`RegistrationError::InvalidParameter`] if the lengths differ
/// - [`RegistrationError::SvdFailed`] if the decomposition fails
///
/// # Example
///
/// ```
/// use strain_registration::compute_rigid_transform;
/// use nalgebra::Point3;
///
/// let source = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let target = source.map(|p| p + nalgebra::Vector3::new(1.0, 2.0, 3.0));
///
/// let transform = compute_rigid_transform(&source, &target).unwrap();
/// assert!((transform.transform_point(&source[2]) - target[2]).norm() < 1e-9);
/// ```
pub fn compute_rigid_transform(
    source: &[Point3<f64>],
    target: &[Point3<f64>],
) -> RegistrationResult<RigidTransform> {
    if source.is_empty() {
        return Err(RegistrationError::EmptyReceiver);
    }
    if target.is_empty() {
        return Err(RegistrationError::EmptyDonor);
    }
    if source.len() != target.len() {
        return Err(RegistrationError::InvalidParameter(format!(
            "point sets must have equal length: {} vs {}",
            source.len(),
            target.len()
        )));
    }

    let source_centroid = centroid(source);
    let target_centroid = centroid(target);

    // Cross-covariance H = sum(s_i * t_i^T)
    let h = source
        .iter()
        .zip(target)
        .fold(Matrix3::zeros(), |acc: Matrix3<f64>, (s, t)| {
            acc + (s.coords - source_centroid) * (t.coords - target_centroid).transpose()
        });

    let svd = h.svd(true, true);
    let u = svd.u.ok_or(RegistrationError::SvdFailed)?;
    let v = svd.v_t.ok_or(RegistrationError::SvdFailed)?.transpose();

    let mut rotation = v * u.transpose();
    if rotation.determinant() < 0.0 {
        // Reflection: flip the axis of least variance
        let mut v_fixed = v;
        v_fixed.column_mut(2).neg_mut();
        rotation = v_fixed * u.transpose();
    }

    let rotation =
        UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(rotation));
    let translation = target_centroid - rotation * source_centroid;

    Ok(RigidTransform::new(rotation, translation))
}

/// Mean of a non-empty point slice, as a vector.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn centroid(points: &[Point3<f64>]) -> Vector3<f64> {
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    sum / points.len().max(1) as f64
}

/// Root mean square distance between paired points.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn rms_distance(a: &[Point3<f64>], b: &[Point3<f64>]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = a.iter().zip(b).map(|(p, q)| (p - q).norm_squared()).sum();
    (sum_sq / a.len() as f64).sqrt()
}

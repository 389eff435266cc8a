//! Rigid transformation type used for every alignment stage.

use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A rotation followed by a translation.
///
/// Strain comparison only ever moves surfaces rigidly, so there is no scale
/// term: distances between points are preserved.
///
/// # Example
///
/// ```
/// use strain_registration::RigidTransform;
/// use nalgebra::{Point3, Vector3};
///
/// // Rotate 90 degrees about Z, then shift along X
/// let transform =
///     RigidTransform::from_euler_degrees(Vector3::new(1.0, 0.0, 0.0), [0.0, 0.0, 90.0]);
///
/// let moved = transform.transform_point(&Point3::new(1.0, 0.0, 0.0));
/// assert!((moved - Point3::new(1.0, 1.0, 0.0)).norm() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RigidTransform {
    /// Rotation as a unit quaternion.
    pub rotation: UnitQuaternion<f64>,
    /// Translation applied after the rotation.
    pub translation: Vector3<f64>,
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl RigidTransform {
    /// Creates a transform from a rotation and a translation.
    #[must_use]
    pub const fn new(rotation: UnitQuaternion<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// The identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self::new(UnitQuaternion::identity(), Vector3::zeros())
    }

    /// Pure translation.
    #[must_use]
    pub fn from_translation(translation: Vector3<f64>) -> Self {
        Self::new(UnitQuaternion::identity(), translation)
    }

    /// Pure rotation about the origin.
    #[must_use]
    pub fn from_rotation(rotation: UnitQuaternion<f64>) -> Self {
        Self::new(rotation, Vector3::zeros())
    }

    /// Builds the explicit-parameter initial transform.
    ///
    /// The matrix is `T · Rx · Ry · Rz`: a point is rotated about Z first,
    /// then Y, then X (all angles in degrees, about the origin), and finally
    /// translated.
    #[must_use]
    pub fn from_euler_degrees(translation: Vector3<f64>, rotation_degrees: [f64; 3]) -> Self {
        let [rx, ry, rz] = rotation_degrees;
        let qx = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), rx.to_radians());
        let qy = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), ry.to_radians());
        let qz = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), rz.to_radians());
        Self::new(qx * qy * qz, translation)
    }

    /// Transforms a point.
    #[inline]
    #[must_use]
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * point.coords + self.translation)
    }

    /// Transforms a direction (rotation only).
    #[inline]
    #[must_use]
    pub fn transform_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * vector
    }

    /// Transforms every point of a slice into a new vector.
    #[must_use]
    pub fn transform_points(&self, points: &[Point3<f64>]) -> Vec<Point3<f64>> {
        points.iter().map(|p| self.transform_point(p)).collect()
    }

    /// Composes two transforms: the result applies `other` first, then `self`.
    #[must_use]
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            rotation: self.rotation * other.rotation,
            translation: self.translation + self.rotation * other.translation,
        }
    }

    /// The inverse transform.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let inv_rotation = self.rotation.inverse();
        Self {
            rotation: inv_rotation,
            translation: inv_rotation * -self.translation,
        }
    }

    /// 4x4 homogeneous matrix.
    #[must_use]
    pub fn to_matrix4(&self) -> Matrix4<f64> {
        let mut mat = self.rotation.to_homogeneous();
        mat[(0, 3)] = self.translation.x;
        mat[(1, 3)] = self.translation.y;
        mat[(2, 3)] = self.translation.z;
        mat
    }

    /// Returns true if rotation angle and translation are both below `epsilon`.
    #[must_use]
    pub fn is_identity(&self, epsilon: f64) -> bool {
        self.rotation.angle().abs() < epsilon && self.translation.norm() < epsilon
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix3, Rotation3};

    #[test]
    fn test_identity() {
        let t = RigidTransform::identity();
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(t.transform_point(&p), p);
        assert!(t.is_identity(1e-12));
    }

    #[test]
    fn test_euler_order_matches_matrix_product() {
        let angles = [30.0_f64, -45.0, 60.0];
        let t = RigidTransform::from_euler_degrees(Vector3::new(1.0, -2.0, 0.5), angles);

        let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), angles[0].to_radians());
        let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), angles[1].to_radians());
        let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), angles[2].to_radians());
        let expected: Matrix3<f64> = (rx * ry * rz).into_inner();

        let p = Point3::new(0.3, 0.7, -1.1);
        let by_matrix = Point3::from(expected * p.coords + Vector3::new(1.0, -2.0, 0.5));
        assert_relative_eq!(t.transform_point(&p), by_matrix, epsilon = 1e-12);
    }

    #[test]
    fn test_single_axis_rotations() {
        let x = Point3::new(1.0, 0.0, 0.0);
        let about_z = RigidTransform::from_euler_degrees(Vector3::zeros(), [0.0, 0.0, 90.0]);
        assert_relative_eq!(
            about_z.transform_point(&x),
            Point3::new(0.0, 1.0, 0.0),
            epsilon = 1e-12
        );

        let about_y = RigidTransform::from_euler_degrees(Vector3::zeros(), [0.0, 90.0, 0.0]);
        assert_relative_eq!(
            about_y.transform_point(&x),
            Point3::new(0.0, 0.0, -1.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_compose_order() {
        let rotate = RigidTransform::from_euler_degrees(Vector3::zeros(), [0.0, 0.0, 90.0]);
        let shift = RigidTransform::from_translation(Vector3::new(1.0, 0.0, 0.0));

        // Shift first, then rotate
        let combined = rotate.compose(&shift);
        let p = combined.transform_point(&Point3::origin());
        assert_relative_eq!(p, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_inverse_round_trip() {
        let t = RigidTransform::from_euler_degrees(Vector3::new(4.0, 5.0, 6.0), [10.0, 20.0, 30.0]);
        assert!(t.compose(&t.inverse()).is_identity(1e-10));
    }

    #[test]
    fn test_to_matrix4() {
        let t = RigidTransform::from_euler_degrees(Vector3::new(1.0, 2.0, 3.0), [0.0, 0.0, 90.0]);
        let m = t.to_matrix4();
        let p = m * nalgebra::Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 3.0, epsilon = 1e-12);
        assert_relative_eq!(p.z, 3.0, epsilon = 1e-12);
        assert_eq!(m[(3, 3)], 1.0);
    }

    #[test]
    fn test_vector_ignores_translation() {
        let t = RigidTransform::from_translation(Vector3::new(5.0, 5.0, 5.0));
        assert_eq!(t.transform_vector(&Vector3::x()), Vector3::x());
    }
}

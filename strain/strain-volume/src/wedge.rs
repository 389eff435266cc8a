//! Linear wedge (triangular prism) element.
//!
//! Local vertex order: `0, 1, 2` form the near triangle at `t = 0`, and
//! `3, 4, 5` the far triangle at `t = 1`, with vertex `i + 3` above vertex
//! `i`. Parametric coordinates are `(r, s, t)` with `r, s >= 0`,
//! `r + s <= 1` and `0 <= t <= 1`.
//!
//! Shape functions:
//!
//! ```text
//! N0 = (1 - r - s)(1 - t)   N3 = (1 - r - s) t
//! N1 = r (1 - t)            N4 = r t
//! N2 = s (1 - t)            N5 = s t
//! ```

use nalgebra::{Matrix3, Point3, Vector3};

/// Slack allowed on each parametric bound when testing containment.
pub const PARAMETRIC_TOLERANCE: f64 = 1e-6;

const MAX_NEWTON_ITERATIONS: usize = 20;
const NEWTON_STEP_TOLERANCE: f64 = 1e-12;
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// A point located inside a wedge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WedgeHit {
    /// Parametric coordinates `(r, s, t)` as solved (may sit just outside
    /// the element, within [`PARAMETRIC_TOLERANCE`]).
    pub pcoords: [f64; 3],
    /// Shape-function weights at the clamped parametric point.
    pub weights: [f64; 6],
}

impl WedgeHit {
    /// Weighted sum of per-vertex values.
    #[must_use]
    pub fn interpolate(&self, values: &[f64; 6]) -> f64 {
        self.weights.iter().zip(values).map(|(w, v)| w * v).sum()
    }
}

/// Shape-function values at `(r, s, t)`.
#[must_use]
pub fn shape_functions([r, s, t]: [f64; 3]) -> [f64; 6] {
    let u = 1.0 - r - s;
    [
        u * (1.0 - t),
        r * (1.0 - t),
        s * (1.0 - t),
        u * t,
        r * t,
        s * t,
    ]
}

/// Partial derivatives of the shape functions, as rows `d/dr`, `d/ds`, `d/dt`.
fn shape_derivatives([r, s, t]: [f64; 3]) -> [[f64; 6]; 3] {
    let u = 1.0 - r - s;
    [
        [-(1.0 - t), 1.0 - t, 0.0, -t, t, 0.0],
        [-(1.0 - t), 0.0, 1.0 - t, -t, 0.0, t],
        [-u, -r, -s, u, r, s],
    ]
}

/// Maps parametric coordinates to a physical point.
#[must_use]
pub fn evaluate(vertices: &[Point3<f64>; 6], pcoords: [f64; 3]) -> Point3<f64> {
    let n = shape_functions(pcoords);
    Point3::from(
        vertices
            .iter()
            .zip(n)
            .fold(Vector3::zeros(), |acc, (v, w)| acc + v.coords * w),
    )
}

/// Solves for the parametric coordinates of `point` by Newton iteration.
///
/// Returns `None` if the Jacobian is singular (a degenerate cell) or the
/// iteration does not settle.
#[must_use]
pub fn parametric_coords(vertices: &[Point3<f64>; 6], point: &Point3<f64>) -> Option<[f64; 3]> {
    let mut pc = Vector3::new(1.0 / 3.0, 1.0 / 3.0, 0.5);

    for _ in 0..MAX_NEWTON_ITERATIONS {
        let current = [pc.x, pc.y, pc.z];
        let residual = evaluate(vertices, current) - point;

        let derivs = shape_derivatives(current);
        let mut columns = [Vector3::zeros(); 3];
        for (column, d) in columns.iter_mut().zip(derivs) {
            *column = vertices
                .iter()
                .zip(d)
                .fold(Vector3::zeros(), |acc, (v, w)| acc + v.coords * w);
        }
        let jacobian = Matrix3::from_columns(&columns);

        let scale = columns[0].norm() * columns[1].norm() * columns[2].norm();
        if scale == 0.0 || jacobian.determinant().abs() <= SINGULAR_TOLERANCE * scale {
            return None;
        }

        let step = jacobian.lu().solve(&residual)?;
        pc -= step;

        if step.amax() < NEWTON_STEP_TOLERANCE {
            return pc.iter().all(|c| c.is_finite()).then_some([pc.x, pc.y, pc.z]);
        }
    }
    None
}

/// True if `(r, s, t)` lies in the element within [`PARAMETRIC_TOLERANCE`].
#[must_use]
pub fn is_inside([r, s, t]: [f64; 3]) -> bool {
    let tol = PARAMETRIC_TOLERANCE;
    r >= -tol && s >= -tol && 1.0 - r - s >= -tol && t >= -tol && 1.0 - t >= -tol
}

/// Projects `(r, s, t)` onto the element.
#[must_use]
pub fn clamp([r, s, t]: [f64; 3]) -> [f64; 3] {
    let (mut r, mut s) = (r.max(0.0), s.max(0.0));
    let sum = r + s;
    if sum > 1.0 {
        r /= sum;
    }
    // Keeps 1 - r - s from rounding below zero
    if 1.0 - r - s < 0.0 {
        s = 1.0 - r;
    }
    [r, s, t.clamp(0.0, 1.0)]
}

/// Locates `point` in the wedge, returning its interpolation weights.
///
/// Returns `None` if the point is outside or the cell is degenerate. The
/// weights are evaluated at the clamped parametric point, so they are each
/// in `[0, 1]` and sum to 1.
///
/// # Example
///
/// ```
/// use strain_volume::wedge::locate;
/// use nalgebra::Point3;
///
/// let wedge = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(0.0, 0.0, 1.0),
///     Point3::new(1.0, 0.0, 1.0),
///     Point3::new(0.0, 1.0, 1.0),
/// ];
///
/// let hit = locate(&wedge, &Point3::new(1.0, 0.0, 0.5)).unwrap();
/// assert!((hit.weights[1] - 0.5).abs() < 1e-12);
/// assert!((hit.weights[4] - 0.5).abs() < 1e-12);
///
/// assert!(locate(&wedge, &Point3::new(1.0, 1.0, 0.5)).is_none());
/// ```
#[must_use]
pub fn locate(vertices: &[Point3<f64>; 6], point: &Point3<f64>) -> Option<WedgeHit> {
    let pcoords = parametric_coords(vertices, point)?;
    if !is_inside(pcoords) {
        return None;
    }
    Some(WedgeHit {
        pcoords,
        weights: shape_functions(clamp(pcoords)),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_wedge() -> [Point3<f64>; 6] {
        [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ]
    }

    /// Skewed, translated prism shaped like an extruded surface triangle.
    fn skewed_wedge() -> [Point3<f64>; 6] {
        let base = [
            Point3::new(2.0, 1.0, -0.3),
            Point3::new(3.5, 1.2, 0.1),
            Point3::new(2.4, 2.9, 0.4),
        ];
        let offset = Vector3::new(0.2, -0.1, 10.0);
        [
            base[0] - offset * 0.5,
            base[1] - offset * 0.5,
            base[2] - offset * 0.5,
            base[0] + offset * 0.5,
            base[1] + offset * 0.5,
            base[2] + offset * 0.5,
        ]
    }

    #[test]
    fn test_shape_functions_partition_of_unity() {
        for pc in [[0.2, 0.3, 0.4], [0.0, 0.0, 0.0], [0.5, 0.5, 1.0], [0.1, 0.8, 0.9]] {
            let sum: f64 = shape_functions(pc).iter().sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_vertices_map_to_unit_weights() {
        let corners = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [0.0, 1.0, 1.0],
        ];
        for (i, pc) in corners.into_iter().enumerate() {
            let n = shape_functions(pc);
            for (j, w) in n.iter().enumerate() {
                assert_eq!(*w, if i == j { 1.0 } else { 0.0 });
            }
        }
    }

    #[test]
    fn test_newton_recovers_pcoords() {
        let wedge = skewed_wedge();
        let pc = [0.25, 0.35, 0.7];
        let point = evaluate(&wedge, pc);
        let solved = parametric_coords(&wedge, &point).unwrap();
        for (a, b) in solved.iter().zip(pc) {
            assert_relative_eq!(*a, b, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_locate_vertex_reproduces_value() {
        let wedge = skewed_wedge();
        let values = [1.0, 2.0, 3.0, 1.0, 2.0, 3.0];
        // Midway up the edge above vertex 1
        let mid = nalgebra::center(&wedge[1], &wedge[4]);
        let hit = locate(&wedge, &mid).unwrap();
        assert_relative_eq!(hit.interpolate(&values), 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_locate_outside() {
        let wedge = unit_wedge();
        assert!(locate(&wedge, &Point3::new(0.6, 0.6, 0.5)).is_none());
        assert!(locate(&wedge, &Point3::new(0.2, 0.2, 1.5)).is_none());
        assert!(locate(&wedge, &Point3::new(-0.1, 0.2, 0.5)).is_none());
    }

    #[test]
    fn test_boundary_tolerance() {
        let wedge = unit_wedge();
        // Just beyond the t = 1 face, within tolerance
        let hit = locate(&wedge, &Point3::new(0.2, 0.2, 1.0 + 1e-8)).unwrap();
        let sum: f64 = hit.weights.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
        assert!(hit.weights.iter().all(|w| (0.0..=1.0).contains(w)));
    }

    #[test]
    fn test_degenerate_wedge_not_inside() {
        // Collapsed base triangle: zero volume
        let flat = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(2.0, 0.0, 1.0),
        ];
        assert!(locate(&flat, &Point3::new(1.0, 0.0, 0.5)).is_none());

        let point = [Point3::origin(); 6];
        assert!(locate(&point, &Point3::origin()).is_none());
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp([-0.1, 0.5, 1.2]), [0.0, 0.5, 1.0]);
        let [r, s, _] = clamp([0.75, 0.75, 0.5]);
        assert_relative_eq!(r + s, 1.0);
        assert_relative_eq!(r, 0.5);
    }
}

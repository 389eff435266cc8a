//! Rigid-body Iterative Closest Point refinement.
//!
//! Each iteration:
//! 1. Transforms the moving landmarks by the current estimate
//! 2. Finds each landmark's nearest donor point (KD-tree, in parallel)
//! 3. Fits the best rigid step for those pairs and composes it on
//!
//! The loop stops when the RMS correspondence distance changes by less than
//! the threshold, or after `max_iterations`. Running out of iterations is not
//! an error; the best transform seen is returned with `converged = false`.

use crate::kabsch::{compute_rigid_transform, rms_distance};
use crate::{RegistrationError, RegistrationResult, RigidTransform};
use kiddo::{ImmutableKdTree, SquaredEuclidean};
use nalgebra::Point3;
use rayon::prelude::*;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters for ICP refinement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IcpParams {
    /// Maximum number of iterations (default: 50).
    pub max_iterations: u32,
    /// Stop when the RMS distance changes by less than this (default: 1e-6).
    pub convergence_threshold: f64,
    /// Cap on moving points used as correspondence sources, sampled at an even
    /// stride. `None` uses every point (default: `Some(200)`).
    pub max_landmarks: Option<usize>,
}

impl Default for IcpParams {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            convergence_threshold: 1e-6,
            max_landmarks: Some(200),
        }
    }
}

impl IcpParams {
    /// Creates ICP parameters with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of iterations.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the convergence threshold.
    #[must_use]
    pub const fn with_convergence_threshold(mut self, threshold: f64) -> Self {
        self.convergence_threshold = threshold;
        self
    }

    /// Sets the landmark cap (`None` = use every point).
    #[must_use]
    pub const fn with_max_landmarks(mut self, max_landmarks: Option<usize>) -> Self {
        self.max_landmarks = max_landmarks;
        self
    }

    fn validate(&self) -> RegistrationResult<()> {
        if self.convergence_threshold.is_nan() || self.convergence_threshold < 0.0 {
            return Err(RegistrationError::InvalidParameter(format!(
                "convergence threshold must be non-negative, got {}",
                self.convergence_threshold
            )));
        }
        if self.max_landmarks == Some(0) {
            return Err(RegistrationError::InvalidParameter(
                "max_landmarks must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result of ICP refinement.
#[derive(Debug, Clone)]
pub struct IcpResult {
    /// Transform taking the moving points onto the fixed points.
    pub transform: RigidTransform,
    /// RMS nearest-point distance under `transform`.
    pub rms_error: f64,
    /// Largest nearest-point distance under `transform`.
    pub max_error: f64,
    /// Number of iterations performed.
    pub iterations: u32,
    /// Whether the RMS change dropped below the threshold.
    pub converged: bool,
    /// Number of landmarks used per iteration.
    pub landmark_count: usize,
}

/// Refines the alignment of `moving` onto `fixed`.
///
/// `moving` should already carry any initial transform; the returned
/// transform is the refinement only.
///
/// # Errors
///
/// - [`RegistrationError::EmptyReceiver`] / [`RegistrationError::EmptyDonor`]
///   for empty input
/// - [`RegistrationError::InvalidParameter`] for bad parameters
/// - [`RegistrationError::SvdFailed`] if a fitting step fails
///
/// # Example
///
/// ```
/// use strain_registration::{icp_align_points, IcpParams, RigidTransform};
/// use nalgebra::{Point3, Vector3};
///
/// // Non-coplanar cloud
/// let fixed = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.1),
///     Point3::new(0.0, 1.0, 0.2),
///     Point3::new(0.0, 0.0, 1.0),
///     Point3::new(1.0, 1.0, 1.3),
/// ];
/// let moving = RigidTransform::from_translation(Vector3::new(0.05, -0.03, 0.02))
///     .transform_points(&fixed);
///
/// let result = icp_align_points(&moving, &fixed, &IcpParams::default()).unwrap();
/// assert!(result.converged);
/// assert!(result.rms_error < 1e-6);
/// ```
pub fn icp_align_points(
    moving: &[Point3<f64>],
    fixed: &[Point3<f64>],
    params: &IcpParams,
) -> RegistrationResult<IcpResult> {
    if moving.is_empty() {
        return Err(RegistrationError::EmptyReceiver);
    }
    if fixed.is_empty() {
        return Err(RegistrationError::EmptyDonor);
    }
    params.validate()?;

    let tree = build_kdtree(fixed);
    let landmarks = select_landmarks(moving, params.max_landmarks);

    let mut current = RigidTransform::identity();
    let mut best = (current, f64::INFINITY);
    let mut prev_rms = f64::INFINITY;
    let mut converged = false;
    let mut iterations = 0;

    for iter in 0..params.max_iterations {
        iterations = iter + 1;

        let transformed = current.transform_points(&landmarks);
        let matched = find_correspondences(&transformed, fixed, &tree);
        let rms = rms_distance(&transformed, &matched);

        if rms < best.1 {
            best = (current, rms);
        }

        debug!(iteration = iterations, rms, "icp step");

        if (prev_rms - rms).abs() < params.convergence_threshold {
            converged = true;
            break;
        }
        prev_rms = rms;

        let step = compute_rigid_transform(&transformed, &matched)?;
        current = step.compose(&current);
    }

    // The last step may not have been scored yet
    let last = score(&current, &landmarks, fixed, &tree);
    let (transform, (rms_error, max_error)) = if last.0 <= best.1 {
        (current, last)
    } else {
        (best.0, score(&best.0, &landmarks, fixed, &tree))
    };

    Ok(IcpResult {
        transform,
        rms_error,
        max_error,
        iterations,
        converged,
        landmark_count: landmarks.len(),
    })
}

fn score(
    transform: &RigidTransform,
    landmarks: &[Point3<f64>],
    fixed: &[Point3<f64>],
    tree: &ImmutableKdTree<f64, 3>,
) -> (f64, f64) {
    let transformed = transform.transform_points(landmarks);
    let matched = find_correspondences(&transformed, fixed, tree);
    let max = transformed
        .iter()
        .zip(&matched)
        .map(|(p, q)| (p - q).norm())
        .fold(0.0, f64::max);
    (rms_distance(&transformed, &matched), max)
}

/// Static tree over `points`; items are slice indices. Grid-aligned and
/// planar inputs with many equal coordinates are fine.
fn build_kdtree(points: &[Point3<f64>]) -> ImmutableKdTree<f64, 3> {
    let coords: Vec<[f64; 3]> = points.iter().map(|p| [p.x, p.y, p.z]).collect();
    ImmutableKdTree::new_from_slice(&coords)
}

/// Evenly strided subset of at most `max` points.
fn select_landmarks(points: &[Point3<f64>], max: Option<usize>) -> Vec<Point3<f64>> {
    match max {
        Some(max) if points.len() > max => {
            let step = points.len().div_ceil(max);
            points.iter().step_by(step).copied().collect()
        }
        _ => points.to_vec(),
    }
}

/// Nearest fixed point for every transformed landmark, index-aligned.
fn find_correspondences(
    transformed: &[Point3<f64>],
    fixed: &[Point3<f64>],
    tree: &ImmutableKdTree<f64, 3>,
) -> Vec<Point3<f64>> {
    transformed
        .par_iter()
        .map(|p| {
            let nearest = tree.nearest_one::<SquaredEuclidean>(&[p.x, p.y, p.z]);
            #[allow(clippy::cast_possible_truncation)]
            fixed[nearest.item as usize]
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Random points on a curved patch; the curvature keeps the fit well
    /// conditioned.
    fn curved_patch(n: usize, seed: u64) -> Vec<Point3<f64>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| {
                let x: f64 = rng.gen_range(-10.0..10.0);
                let y: f64 = rng.gen_range(-10.0..10.0);
                Point3::new(x, y, 0.05 * x * x - 0.03 * y * y + 0.02 * x * y)
            })
            .collect()
    }

    #[test]
    fn test_identity_converges_immediately() {
        let fixed = curved_patch(100, 42);
        let result = icp_align_points(&fixed, &fixed, &IcpParams::default()).unwrap();

        assert!(result.converged);
        assert!(result.transform.is_identity(1e-9));
        assert!(result.rms_error < 1e-12);
        assert_eq!(result.iterations, 2);
    }

    #[test]
    fn test_recovers_small_offset() {
        let fixed = curved_patch(400, 7);
        let offset =
            RigidTransform::from_euler_degrees(Vector3::new(0.05, -0.04, 0.03), [0.1, -0.1, 0.2]);
        let moving = offset.transform_points(&fixed);

        let params = IcpParams::new().with_max_landmarks(None).with_max_iterations(100);
        let result = icp_align_points(&moving, &fixed, &params).unwrap();

        assert!(result.rms_error < 1e-3, "rms {}", result.rms_error);
        let recovered = result.transform.compose(&offset);
        assert!(recovered.is_identity(1e-3));
    }

    #[test]
    fn test_non_convergence_is_not_error() {
        let fixed = curved_patch(100, 3);
        let moving = RigidTransform::from_translation(Vector3::new(1.0, 0.5, 0.0))
            .transform_points(&fixed);

        let params = IcpParams::new().with_max_iterations(1);
        let result = icp_align_points(&moving, &fixed, &params).unwrap();
        assert_eq!(result.iterations, 1);
        assert!(!result.converged);
        assert!(result.rms_error.is_finite());
    }

    #[test]
    fn test_best_iterate_never_worse_than_start() {
        let fixed = curved_patch(150, 11);
        let moving =
            RigidTransform::from_euler_degrees(Vector3::new(0.5, 0.5, 0.2), [0.0, 0.0, 3.0])
                .transform_points(&fixed);

        let start = {
            let tree = build_kdtree(&fixed);
            let matched = find_correspondences(&moving, &fixed, &tree);
            rms_distance(&moving, &matched)
        };
        let result = icp_align_points(&moving, &fixed, &IcpParams::new().with_max_iterations(3))
            .unwrap();
        assert!(result.rms_error <= start);
    }

    /// Planar `n` x `n` grid at height `z`, unit spacing.
    fn flat_grid(n: u32, z: f64) -> Vec<Point3<f64>> {
        (0..n)
            .flat_map(|j| (0..n).map(move |i| Point3::new(f64::from(i), f64::from(j), z)))
            .collect()
    }

    #[test]
    fn test_flat_grid_with_shared_coordinates() {
        // Whole rows share y, whole columns share x, every point shares z
        let fixed = flat_grid(25, 0.0);
        let result = icp_align_points(&fixed, &fixed, &IcpParams::default()).unwrap();
        assert!(result.converged);
        assert!(result.rms_error < 1e-12);

        let lifted = flat_grid(25, 0.3);
        let params = IcpParams::new().with_max_landmarks(None);
        let result = icp_align_points(&lifted, &fixed, &params).unwrap();
        assert!(result.rms_error < 1e-9, "rms {}", result.rms_error);
        let moved = result.transform.transform_point(&lifted[0]);
        assert_relative_eq!(moved, fixed[0], epsilon = 1e-9);
    }

    #[test]
    fn test_landmark_cap() {
        let points = curved_patch(1000, 5);
        let selected = select_landmarks(&points, Some(200));
        assert_eq!(selected.len(), 200);
        assert_eq!(selected[1], points[5]);

        assert_eq!(select_landmarks(&points[..50], Some(200)).len(), 50);
        assert_eq!(select_landmarks(&points, None).len(), 1000);

        let result = icp_align_points(&points, &points, &IcpParams::default()).unwrap();
        assert_eq!(result.landmark_count, 200);
    }

    #[test]
    fn test_errors() {
        let pts = curved_patch(10, 1);
        assert!(matches!(
            icp_align_points(&[], &pts, &IcpParams::default()),
            Err(RegistrationError::EmptyReceiver)
        ));
        assert!(matches!(
            icp_align_points(&pts, &[], &IcpParams::default()),
            Err(RegistrationError::EmptyDonor)
        ));
        assert!(matches!(
            icp_align_points(&pts, &pts, &IcpParams::new().with_max_landmarks(Some(0))),
            Err(RegistrationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_params_builder() {
        let params = IcpParams::new()
            .with_max_iterations(10)
            .with_convergence_threshold(1e-3)
            .with_max_landmarks(Some(20));
        assert_eq!(params.max_iterations, 10);
        assert_relative_eq!(params.convergence_threshold, 1e-3);
        assert_eq!(params.max_landmarks, Some(20));
    }
}

//! End-to-end comparison scenarios.
//!
//! Run with: cargo test -p strain-compare --test pipeline_scenarios

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use approx::assert_relative_eq;
use strain_compare::io::{read_vtu, write_volume_vtu};
use strain_compare::prelude::*;
use strain_compare::registration::RigidTransform;

// =============================================================================
// Fixtures
// =============================================================================

fn unit_square(value: f64) -> Surface {
    Surface::new(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ],
        vec![[0, 1, 2], [0, 2, 3]],
    )
    .unwrap()
    .with_field("strain", vec![value; 4])
    .unwrap()
}

/// Dome-shaped `n` x `n` grid, 0.5 spacing, with a smooth strain field.
fn dome(n: u32, strain: impl Fn(f64, f64) -> f64) -> Surface {
    let mut points = Vec::new();
    for j in 0..=n {
        for i in 0..=n {
            let x = f64::from(i) * 0.5 - f64::from(n) * 0.25;
            let y = f64::from(j) * 0.5 - f64::from(n) * 0.25;
            points.push(Point3::new(x, y, 3.0 - 0.02 * (x * x + 1.5 * y * y)));
        }
    }
    let row = n + 1;
    let mut triangles = Vec::new();
    for j in 0..n {
        for i in 0..n {
            let a = j * row + i;
            triangles.push([a, a + 1, a + row + 1]);
            triangles.push([a, a + row + 1, a + row]);
        }
    }
    let values = points.iter().map(|p| strain(p.x, p.y)).collect();
    Surface::new(points, triangles)
        .unwrap()
        .with_field("strain", values)
        .unwrap()
}

/// Planar `n` x `n` grid at z = 0, 0.5 spacing, uniform strain.
fn flat_grid(n: u32, value: f64) -> Surface {
    let mut points = Vec::new();
    for j in 0..n {
        for i in 0..n {
            points.push(Point3::new(f64::from(i) * 0.5, f64::from(j) * 0.5, 0.0));
        }
    }
    let mut triangles = Vec::new();
    for j in 0..n - 1 {
        for i in 0..n - 1 {
            let a = j * n + i;
            triangles.push([a, a + 1, a + n + 1]);
            triangles.push([a, a + n + 1, a + n]);
        }
    }
    let count = points.len();
    Surface::new(points, triangles)
        .unwrap()
        .with_field("strain", vec![value; count])
        .unwrap()
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn coincident_squares_give_uniform_delta() {
    let receiver = unit_square(1.0);
    let donor = unit_square(2.0);

    let comparison = compare_surfaces(&receiver, &donor, &PipelineConfig::default()).unwrap();

    assert_eq!(comparison.probe.located, 4);
    assert_eq!(comparison.probe.outside, 0);
    assert_eq!(comparison.volume.point_count(), 8);
    assert_eq!(comparison.volume.cell_count(), 2);

    let compiled = &comparison.compiled;
    assert_eq!(compiled.point_count(), 4);
    assert_eq!(compiled.surface().triangle_count(), 2);
    assert_eq!(
        compiled.field_names(),
        ["Drop Tower Strain", "Instron Strain", "delta"]
    );
    for row in compiled.rows() {
        assert_eq!(row.receiver, 1.0);
        assert_relative_eq!(row.donor, 2.0, epsilon = 1e-12);
        assert_relative_eq!(row.delta, 1.0, epsilon = 1e-12);
    }
}

#[test]
fn flat_grids_compare_cleanly() {
    let receiver = flat_grid(20, 1.0);
    let donor = flat_grid(20, 2.0);

    let comparison = compare_surfaces(&receiver, &donor, &PipelineConfig::default()).unwrap();

    assert!(comparison.alignment.rms_error < 1e-9);
    assert_eq!(comparison.probe.outside, 0);
    assert_eq!(comparison.compiled.point_count(), 400);
    assert_eq!(comparison.compiled.surface().triangle_count(), 2 * 19 * 19);
    for d in comparison.compiled.delta_values() {
        assert_relative_eq!(*d, 1.0, epsilon = 1e-9);
    }
}

#[test]
fn compiled_surface_serializes_for_reporting() {
    let comparison =
        compare_surfaces(&unit_square(1.0), &unit_square(2.0), &PipelineConfig::default())
            .unwrap();
    let json = serde_json::to_value(&comparison.compiled).unwrap();
    assert_eq!(json["source_indices"], serde_json::json!([0, 1, 2, 3]));
    assert_eq!(json["source_point_count"], 4);
    assert_eq!(json["source_triangle_count"], 2);
}

#[test]
fn far_triangle_is_removed() {
    // Square plus a detached triangle far above it
    let receiver = Surface::new(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.2, 0.2, 40.0),
            Point3::new(0.8, 0.2, 40.0),
            Point3::new(0.5, 0.8, 40.0),
        ],
        vec![[0, 1, 2], [0, 2, 3], [4, 5, 6]],
    )
    .unwrap()
    .with_field("strain", vec![0.5; 7])
    .unwrap();
    let donor = unit_square(2.0);

    // Initial placement only; ICP would pull the detached triangle in
    let config = PipelineConfig::new().with_icp(IcpParams::new().with_max_iterations(0));
    let comparison = compare_surfaces(&receiver, &donor, &config).unwrap();

    assert_eq!(comparison.probe.outside, 3);
    let compiled = &comparison.compiled;
    assert_eq!(compiled.point_count(), 4);
    assert_eq!(compiled.surface().triangle_count(), 2);
    assert_eq!(compiled.discarded_points(), 3);
    assert!(compiled.delta_values().iter().all(|&d| d > -999_990.0));
    assert!((0..4).all(|i| compiled.source_index(i) == Some(i)));
}

#[test]
fn initial_transform_recovers_offset_receiver() {
    let donor = dome(12, |x, y| 0.01 * x - 0.02 * y);
    let receiver_values = donor.field("strain").unwrap().values().to_vec();

    // Receiver measured in a frame shifted and turned about z
    let misplacement =
        RigidTransform::from_euler_degrees(Vector3::new(10.0, -4.0, 1.0), [0.0, 0.0, 30.0]);
    let receiver = donor
        .with_points(misplacement.transform_points(donor.points()))
        .unwrap()
        .with_field("strain", receiver_values.iter().map(|v| v + 0.001).collect())
        .unwrap();

    let undo = misplacement.inverse();
    let config = PipelineConfig::new().with_initial(InitialAlignment::Parameters {
        translation: undo.translation,
        rotation_degrees: euler_degrees(&undo),
    });
    let comparison = compare_surfaces(&receiver, &donor, &config).unwrap();

    assert!(comparison.alignment.rms_error < 1e-6);
    assert_eq!(comparison.probe.outside, 0);
    assert_eq!(comparison.compiled.point_count(), receiver.point_count());
    for d in comparison.compiled.delta_values() {
        assert_relative_eq!(*d, -0.001, epsilon = 1e-6);
    }
}

#[test]
fn landmarks_recover_offset_receiver() {
    let donor = dome(10, |x, _| 0.05 * x);
    let misplacement =
        RigidTransform::from_euler_degrees(Vector3::new(-3.0, 7.0, 0.5), [5.0, -10.0, 60.0]);
    let receiver = donor
        .with_points(misplacement.transform_points(donor.points()))
        .unwrap();

    let picks = [0_usize, 10, 115];
    let pairs = LandmarkPairs::new(
        picks.map(|i| receiver.points()[i]),
        picks.map(|i| donor.points()[i]),
    );
    let config = PipelineConfig::new().with_initial(InitialAlignment::Landmarks(pairs));
    let comparison = compare_surfaces(&receiver, &donor, &config).unwrap();

    assert_eq!(comparison.compiled.point_count(), receiver.point_count());
    for d in comparison.compiled.delta_values() {
        assert_relative_eq!(*d, 0.0, epsilon = 1e-6);
    }
}

#[test]
fn partial_overlap_keeps_only_shared_region() {
    let donor = dome(8, |x, y| x + y);
    // Receiver shifted by two grid columns in x, inside the donor's frame
    let shifted: Vec<Point3<f64>> = donor
        .points()
        .iter()
        .map(|p| Point3::new(p.x + 1.0, p.y, 3.0 - 0.02 * ((p.x + 1.0).powi(2) + 1.5 * p.y * p.y)))
        .collect();
    let receiver = donor.with_points(shifted).unwrap();

    let config = PipelineConfig::new().with_icp(IcpParams::new().with_max_iterations(0));
    let comparison = compare_surfaces(&receiver, &donor, &config).unwrap();

    // Two of nine columns fall outside the donor
    assert_eq!(comparison.probe.outside, 2 * 9);
    assert_eq!(comparison.compiled.point_count(), 7 * 9);
    assert!(comparison
        .compiled
        .rows()
        .all(|row| row.position.x <= 2.0 + 1e-9));
}

#[test]
fn volume_file_has_wedges() {
    let comparison =
        compare_surfaces(&unit_square(1.0), &unit_square(3.0), &PipelineConfig::default())
            .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("volume.vtu");
    write_volume_vtu(&comparison.volume, &path).unwrap();
    assert!(read_vtu(&path).is_err());

    let result = dir.path().join("strainCompare.vtu");
    write_vtu(comparison.compiled.surface(), &result).unwrap();
    let reloaded = read_vtu(&result).unwrap();
    assert_eq!(reloaded.fields().len(), 3);
    assert_eq!(reloaded.point_count(), 4);
}

#[test]
fn mismatched_field_name_is_an_error() {
    let config = PipelineConfig::new().with_receiver_field("MinPStrain");
    let err = compare_surfaces(&unit_square(1.0), &unit_square(2.0), &config).unwrap_err();
    assert!(matches!(err, StrainError::Compile(_)));
}

/// X-Y-Z Euler angles (degrees) of a transform built as `Rx * Ry * Rz`.
fn euler_degrees(transform: &RigidTransform) -> [f64; 3] {
    let m = transform.rotation.to_rotation_matrix();
    let m = m.matrix();
    // R = Rx Ry Rz: m[(0,2)] = sin(ry)
    let ry = m[(0, 2)].clamp(-1.0, 1.0).asin();
    let rx = (-m[(1, 2)]).atan2(m[(2, 2)]);
    let rz = (-m[(0, 1)]).atan2(m[(0, 0)]);
    [rx.to_degrees(), ry.to_degrees(), rz.to_degrees()]
}
